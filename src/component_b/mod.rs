//component B: Reporter
//consumes tracks from the generator and prints those above the speed threshold
pub mod reporter;
