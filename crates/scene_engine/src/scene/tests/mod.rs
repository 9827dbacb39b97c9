//! Scene-level tests spanning the registry, serializer and scheduler

mod round_trip;
mod scheduling;
