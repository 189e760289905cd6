//! Identity of the resources that data sources read.
mod object_id;

pub use self::object_id::ObjectIdRef;
