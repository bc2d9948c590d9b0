pub mod ownership;
pub mod policy;

pub use ownership::ensure_can_modify;
pub use ownership::Authored;
pub use policy::Access;
pub use policy::Decision;
pub use policy::DenyReason;
pub use policy::RoutePolicy;
