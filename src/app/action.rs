/// Side effects requested by the event handler that the main loop performs.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Hand a `tel:` intent to the outside world
    PlaceCall { intent: String },
    Quit,
}
