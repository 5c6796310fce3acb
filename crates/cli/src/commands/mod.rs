pub mod init;
pub mod replay;

pub use init::init_command;
pub use replay::replay_command;
