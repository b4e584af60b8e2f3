use crate::domain::models::{booking::Booking, resource::Resource};
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a confirmed booking
pub fn generate_ics(resource: &Resource, booking: &Booking) -> String {
    let mut calendar = Calendar::new();

    let mut ical_event = IcalEvent::new();
    ical_event
        .summary(&format!("{} - {}", resource.name, booking.activity_type.label()))
        .description(&format!(
            "Booking #{} for {} participants",
            booking.short_reference(),
            booking.participants
        ))
        .starts(booking.start_time)
        .ends(booking.end_time)
        .uid(&booking.id);
    if let Some(address) = &resource.address {
        ical_event.location(address);
    }

    calendar.push(ical_event.done());
    calendar.to_string()
}
