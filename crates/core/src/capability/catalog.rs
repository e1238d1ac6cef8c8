//! Descriptors for the tools Native IQ ships with.
//!
//! Location lists keep the legacy namespaced (`src.`-prefixed) layout ahead
//! of the flat one, and the historical `calandar_tool` spelling is still
//! probed so older deployments keep resolving.

use super::CapabilityDescriptor;

pub const EMAIL: &str = "email";
pub const CALENDAR: &str = "calendar";
pub const DRIVE: &str = "drive";

/// Service member the drive tool keeps its API client in.
pub const DRIVE_SERVICE: &str = "_drive_service";

pub fn email() -> CapabilityDescriptor {
    CapabilityDescriptor::new(EMAIL)
        .with_locations(["src.domains.tools.email_tool", "domains.tools.email_tool"])
        .with_operations(["email_tool", "send_email", "send"])
}

pub fn calendar() -> CapabilityDescriptor {
    CapabilityDescriptor::new(CALENDAR)
        .with_locations([
            "src.domains.tools.calendar_tool",
            "domains.tools.calendar_tool",
            "src.domains.tools.calandar_tool",
            "domains.tools.calandar_tool",
        ])
        .with_operations(["schedule_meeting", "create_event", "schedule"])
}

pub fn drive() -> CapabilityDescriptor {
    CapabilityDescriptor::new(DRIVE)
        .with_locations([
            "src.domains.tools.google_drive_tool",
            "domains.tools.google_drive_tool",
        ])
        .with_operations(["list_drive_files", "list_files"])
        .requires_service(DRIVE_SERVICE)
}

/// Every built-in descriptor.
pub fn builtin() -> Vec<CapabilityDescriptor> {
    vec![email(), calendar(), drive()]
}
