//! # UTXO Module
//!
//! UTXO bookkeeping, coin selection and the atomic transaction builders.
//!
//! ```text
//! amount.rs   AssetAmount, AssetAmountDestination (per-build accounting)
//! set.rs      Utxo, UtxoSet (+ set algebra, coin selection), SharedUtxoSet
//! builder.rs  build_import_tx, build_export_tx, build_export_from_account
//! error.rs    UtxoError
//! ```

pub mod amount;
pub mod builder;
pub mod error;
pub mod set;

pub use amount::{AssetAmount, AssetAmountDestination};
pub use builder::{
    build_export_from_account, build_export_tx, build_import_tx, AccountExportRequest,
    BuiltExport, ExportRequest, ImportRequest,
};
pub use error::UtxoError;
pub use set::{MergeRule, SharedUtxoSet, Utxo, UtxoSet};
