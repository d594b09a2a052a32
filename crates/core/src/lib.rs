pub mod config;
pub mod domain;
pub mod geo;
pub mod resolver;
pub mod store;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::employee::{Employee, EmployeeId};
pub use domain::event::{
    AttendanceEvent, DayLog, DayState, EventId, EventKind, EventStatus,
};
pub use geo::{Coordinate, CoordinateError, Geofence};
pub use resolver::command::{parse_command, BotCommand};
pub use resolver::replies::{QuickReply, Reply};
pub use resolver::{AttendanceResolver, Decision, InboundEvent, ResolveError};
pub use store::{AttendanceStore, NewEvent, StoreError};
