pub mod champion_stats;
pub mod champion_tables;
pub mod highlight;
pub mod position;
pub mod ranks;
pub mod recommender;
pub mod resolver;
pub mod role_tally;
