pub mod awards;
pub mod dimensions;
pub mod etl;
pub mod games;
pub mod player_season;
pub mod supplementary;
pub mod team_season;

pub use awards::*;
pub use dimensions::*;
pub use etl::*;
pub use games::*;
pub use player_season::*;
pub use supplementary::*;
pub use team_season::*;
