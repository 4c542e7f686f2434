pub mod alert;
pub mod envelope;

pub use alert::{
    AlertCategory, AlertId, AlertPatch, AlertRecord, Direction, FieldUpdate, HitSide, NewAlert,
};
pub use envelope::Envelope;
