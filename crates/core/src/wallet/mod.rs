//! Wallet pass model, builder and validator.

mod builder;
mod model;
mod validator;

pub use builder::build_pass;
pub use model::{Barcode, BarcodeFormat, DocumentType, Pass, PassField, PassStructure};
pub use validator::validate_pass;
