// Component A: Track generator
// fabricates one simulated vehicle observation per tick and hands it
// to the reporter over a rendezvous channel (no queue, depth 1).

pub mod track;
pub mod generator;
