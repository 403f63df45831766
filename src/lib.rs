pub mod photokeep_core;
