use eventclass::event::EventRecord;

/// Fixed event used by the single-record command-line path.
pub fn example_event() -> EventRecord {
    EventRecord::new(5.1234, 0.5678, 1.2345)
}
