//! AT command surface, grouped by feature area.

mod general;
mod gps;
mod network;
mod sms;
mod socket;
