mod health;
mod not_found;
mod report_file;

pub use health::healthz;
pub use not_found::not_found;
pub use report_file::report_file;
