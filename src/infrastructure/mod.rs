pub mod row_store;

pub use row_store::{RecordUpdate, RowStore, StoreEvent};
