pub mod sqlite_availability_override_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_pending_booking_repo;
pub mod sqlite_recurring_block_repo;
pub mod sqlite_resource_repo;
