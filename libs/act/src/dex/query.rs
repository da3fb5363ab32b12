//! The materialised table behind one live DEX query: schema, rows, and the
//! `TableUpdate` application algorithm.

use std::collections::HashMap;
use std::sync::Arc;

use act_types::variant::VariantValue;
use act_types::wire::{self, ColumnDescriptor, TableUpdate, VariantType};
use parking_lot::RwLock;

/// Lifecycle state of a [`DexQuery`]. Mirrors `DexQueryState` in the
/// reference client one-for-one: every state but `Unknown` is entered by a
/// specific transition (start success/failure, schema receipt, update
/// failure, stop success/failure, the connection dropping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DexQueryState {
    Unknown,
    Starting,
    Started,
    StartError,
    ColumnsReceived,
    UpdateError,
    Stopping,
    Stopped,
    Disconnected,
    StopError,
}

#[derive(Debug, Clone)]
pub struct DexColumn {
    pub name: String,
    pub kind: VariantType,
    pub is_vector: bool,
    pub can_write: bool,
}

impl DexColumn {
    fn from_wire(descriptor: &ColumnDescriptor) -> Self {
        let kind = match descriptor.r#type {
            1 => VariantType::Double,
            2 => VariantType::Int32,
            3 => VariantType::Price,
            4 => VariantType::String,
            5 => VariantType::Quantity,
            _ => VariantType::Unknown,
        };
        Self { name: descriptor.name.clone(), kind, is_vector: descriptor.is_vector, can_write: descriptor.can_write }
    }
}

/// Identifies a row independent of its current position in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DexRowKey {
    pub key: String,
    pub contexts: String,
}

#[derive(Debug, Clone)]
pub struct DexCell {
    pub value: VariantValue,
    pub update_count: u64,
}

impl Default for DexCell {
    fn default() -> Self {
        Self { value: VariantValue::Unknown, update_count: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct DexRow {
    pub key: DexRowKey,
    pub row_number: Option<u64>,
    pub cells: Vec<DexCell>,
}

impl DexRow {
    fn new(key: DexRowKey, row_number: Option<u64>, num_columns: usize) -> Self {
        Self { key, row_number, cells: vec![DexCell::default(); num_columns] }
    }

    /// Sets the cell's value and stamps its `update_count` to the query's
    /// current update count, matching the invariant that `cell.update_count
    /// == update_count` iff the cell was touched by the most recent update.
    /// A `column_number` outside the row's current column count is dropped,
    /// matching the reference client rather than growing the row.
    fn set_cell(&mut self, column_number: usize, value: VariantValue, update_count: u64) {
        let Some(cell) = self.cells.get_mut(column_number) else {
            tracing::warn!(column_number, "cell update for unknown column, dropping");
            return;
        };
        cell.value = value;
        cell.update_count = update_count;
    }

    pub fn get_cells(&self) -> &[DexCell] {
        &self.cells
    }

    pub fn get_updated_cells(&self, since_update_count: u64) -> Vec<(usize, &DexCell)> {
        self.cells.iter().enumerate().filter(|(_, c)| c.update_count > since_update_count).collect()
    }

    pub fn get_cell_by_name<'a>(&'a self, name: &str, columns: &[DexColumn]) -> Option<&'a DexCell> {
        columns.iter().position(|c| c.name == name).and_then(|idx| self.cells.get(idx))
    }
}

type StateChangeHandler = Arc<dyn Fn(&DexQuery, DexQueryState, Option<&str>, DexQueryState) + Send + Sync>;
type ColumnsReceivedHandler = Arc<dyn Fn(&DexQuery, &[DexColumn]) + Send + Sync>;
type UpdateHandler = Arc<dyn Fn(&DexQuery, u64, usize, &[DexRow], &[DexRow]) + Send + Sync>;
type ResetHandler = Arc<dyn Fn(&DexQuery, usize, &[DexRow]) + Send + Sync>;

#[derive(Default)]
struct Handlers {
    state_change: Vec<StateChangeHandler>,
    columns_received: Vec<ColumnsReceivedHandler>,
    update: Vec<UpdateHandler>,
    reset: Vec<ResetHandler>,
}

/// One live or one-time DEX query and its materialised result table.
///
/// Row identity survives a `TableUpdate` that omits `key`/`contexts` and only
/// carries a `rowNumber`: the first update for a row caches
/// `rowNumber -> DexRowKey`, and later updates that only supply the number
/// are resolved through that cache.
pub struct DexQuery {
    state: RwLock<DexQueryState>,
    err_msg: RwLock<Option<String>>,
    is_snapshot: bool,
    update_count: RwLock<u64>,
    columns: RwLock<Vec<DexColumn>>,
    rows: RwLock<Vec<DexRow>>,
    row_keys: RwLock<HashMap<DexRowKey, usize>>,
    row_number_keys: RwLock<HashMap<u64, DexRowKey>>,
    handlers: RwLock<Handlers>,
}

impl DexQuery {
    pub fn new(is_snapshot: bool) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(DexQueryState::Unknown),
            err_msg: RwLock::new(None),
            is_snapshot,
            update_count: RwLock::new(0),
            columns: RwLock::new(Vec::new()),
            rows: RwLock::new(Vec::new()),
            row_keys: RwLock::new(HashMap::new()),
            row_number_keys: RwLock::new(HashMap::new()),
            handlers: RwLock::new(Handlers::default()),
        })
    }

    pub fn state(&self) -> DexQueryState {
        *self.state.read()
    }

    pub fn err_msg(&self) -> Option<String> {
        self.err_msg.read().clone()
    }

    pub fn is_snapshot(&self) -> bool {
        self.is_snapshot
    }

    pub fn update_count(&self) -> u64 {
        *self.update_count.read()
    }

    pub fn columns(&self) -> Vec<DexColumn> {
        self.columns.read().clone()
    }

    pub fn get_rows(&self) -> Vec<DexRow> {
        self.rows.read().clone()
    }

    pub fn get_updated_rows(&self, since_update_count: u64) -> Vec<DexRow> {
        self.rows
            .read()
            .iter()
            .filter(|row| row.cells.iter().any(|c| c.update_count > since_update_count))
            .cloned()
            .collect()
    }

    pub fn get_row_by_key(&self, key: &DexRowKey) -> Option<DexRow> {
        let idx = *self.row_keys.read().get(key)?;
        self.rows.read().get(idx).cloned()
    }

    pub fn add_state_change_handler(&self, handler: StateChangeHandler) {
        self.handlers.write().state_change.push(handler);
    }

    pub fn add_columns_received_handler(&self, handler: ColumnsReceivedHandler) {
        self.handlers.write().columns_received.push(handler);
    }

    pub fn add_update_handler(&self, handler: UpdateHandler) {
        self.handlers.write().update.push(handler);
    }

    pub fn add_reset_handler(&self, handler: ResetHandler) {
        self.handlers.write().reset.push(handler);
    }

    /// Transition to `new_state` with no error message, firing every
    /// registered state-change handler with the state in effect before and
    /// after.
    pub(crate) fn set_state(&self, new_state: DexQueryState) {
        self.change_state(new_state, None);
    }

    fn change_state(&self, new_state: DexQueryState, err_msg: Option<String>) {
        let old_state = {
            let mut state = self.state.write();
            let old_state = *state;
            *state = new_state;
            old_state
        };
        *self.err_msg.write() = err_msg.clone();
        for handler in self.handlers.read().state_change.iter() {
            handler(self, new_state, err_msg.as_deref(), old_state);
        }
    }

    /// `err_msg` non-empty means the `StartQuery` request failed; otherwise
    /// the query is now `Started`.
    pub(crate) fn on_start_query(&self, err_msg: Option<String>) {
        match err_msg.filter(|msg| !msg.is_empty()) {
            Some(msg) => self.change_state(DexQueryState::StartError, Some(msg)),
            None => self.change_state(DexQueryState::Started, None),
        }
    }

    /// `err_msg` non-empty means the `StopQuery` request failed; otherwise
    /// the query is now `Stopped`.
    pub(crate) fn on_stop_query(&self, err_msg: Option<String>) {
        match err_msg.filter(|msg| !msg.is_empty()) {
            Some(msg) => self.change_state(DexQueryState::StopError, Some(msg)),
            None => self.change_state(DexQueryState::Stopped, None),
        }
    }

    /// A `TableUpdate` response carrying an operation error: the update is
    /// dropped rather than applied.
    pub(crate) fn on_update_error(&self, err_msg: String) {
        self.change_state(DexQueryState::UpdateError, Some(err_msg));
    }

    /// The underlying connection was lost while this query was live.
    pub(crate) fn mark_disconnected(&self) {
        self.change_state(DexQueryState::Disconnected, None);
    }

    /// Apply one `TableUpdate`. A non-empty `column_descriptor` always means
    /// a schema reset: existing rows are dropped (after firing reset
    /// handlers with the prior rows) before the new schema and any rows in
    /// the same update are applied. Every row touched by the update — new or
    /// pre-existing — is reported to update handlers, matching the
    /// reference client's unconditional append to `new_updated_rows`.
    pub(crate) fn apply_table_update(&self, update: &TableUpdate) {
        let update_count = {
            let mut count = self.update_count.write();
            *count += 1;
            *count
        };

        if !update.column_descriptor.is_empty() {
            self.reset();
            let columns: Vec<DexColumn> = update.column_descriptor.iter().map(DexColumn::from_wire).collect();
            *self.columns.write() = columns.clone();
            self.change_state(DexQueryState::ColumnsReceived, None);
            for handler in self.handlers.read().columns_received.iter() {
                handler(self, &columns);
            }
        }

        let num_columns = self.columns.read().len();
        let mut new_row_indices = Vec::new();
        let mut new_updated_rows = Vec::new();

        for wire_row in &update.row {
            let row_key = self.resolve_row_key(wire_row);
            let row_idx = {
                let existing = self.row_keys.read().get(&row_key).copied();
                match existing {
                    Some(idx) => idx,
                    None => {
                        let mut rows = self.rows.write();
                        let idx = rows.len();
                        rows.push(DexRow::new(row_key.clone(), wire_row.row_number, num_columns));
                        self.row_keys.write().insert(row_key, idx);
                        new_row_indices.push(idx);
                        idx
                    }
                }
            };

            let mut rows = self.rows.write();
            let row = &mut rows[row_idx];
            for cell in &wire_row.cell {
                let value = match &cell.value {
                    Some(scalar) => VariantValue::from_wire(scalar),
                    None => VariantValue::Vector(cell.value_vector.iter().map(VariantValue::from_wire).collect()),
                };
                row.set_cell(cell.column_number as usize, value, update_count);
            }
            new_updated_rows.push(row.clone());
        }

        let rows_snapshot = self.rows.read();
        let new_rows: Vec<DexRow> = new_row_indices.iter().map(|&idx| rows_snapshot[idx].clone()).collect();
        let num_rows = rows_snapshot.len();
        drop(rows_snapshot);

        for handler in self.handlers.read().update.iter() {
            handler(self, update_count, num_rows, &new_rows, &new_updated_rows);
        }
    }

    fn resolve_row_key(&self, wire_row: &wire::Row) -> DexRowKey {
        if !wire_row.key.is_empty() || !wire_row.contexts.is_empty() {
            let key = DexRowKey { key: wire_row.key.clone(), contexts: wire_row.contexts.clone() };
            if let Some(row_number) = wire_row.row_number {
                self.row_number_keys.write().insert(row_number, key.clone());
            }
            return key;
        }
        if let Some(row_number) = wire_row.row_number {
            if let Some(cached) = self.row_number_keys.read().get(&row_number).cloned() {
                return cached;
            }
            tracing::warn!(row_number, "rowNumber seen with no prior key; synthesizing one");
            return DexRowKey { key: format!("#{row_number}"), contexts: String::new() };
        }
        DexRowKey::default()
    }

    fn reset(&self) {
        let prior_rows = self.rows.read().clone();
        if !prior_rows.is_empty() {
            for handler in self.handlers.read().reset.iter() {
                handler(self, prior_rows.len(), &prior_rows);
            }
        }
        self.columns.write().clear();
        self.rows.write().clear();
        self.row_keys.write().clear();
        self.row_number_keys.write().clear();
    }
}
