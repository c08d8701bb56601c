use crate::domain::OrderStatus;

/// Custom actions for Order entities.
///
/// Manual transitions (`Advance`, `SetStatus`) always revoke the running
/// simulation ticket, so a simulated step that arrives afterwards is ignored.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves one step forward; no-op once delivered.
    Advance,
    /// Jumps forward to (or stays at) the given status.
    ///
    /// # Errors
    /// Fails with `InvalidStatus` when the target lies behind the current status.
    SetStatus(OrderStatus),
    /// Registers the ticket of a newly scheduled simulated progression.
    BeginSimulation(u64),
    /// One timed step of a simulated progression; ignored unless the ticket is current.
    SimulatedAdvance(u64),
    /// Drops the ticket if it is still current.
    EndSimulation(u64),
    /// Attaches the one-time post-delivery rating.
    AttachRating {
        user_id: String,
        rating: u8,
        review: Option<String>,
    },
}

/// Results from OrderActions
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    /// Status before and after; equal when nothing moved.
    Transition { from: OrderStatus, to: OrderStatus },
    /// Whether the simulation ticket was registered.
    Simulation(bool),
    Rated { rating: u8 },
}

impl OrderActionResult {
    pub fn status(&self) -> Option<OrderStatus> {
        match self {
            OrderActionResult::Transition { to, .. } => Some(*to),
            _ => None,
        }
    }
}
