mod json_file;
mod reminder_storage;

pub use json_file::JsonFileStorage;
pub use reminder_storage::ReminderStorage;
