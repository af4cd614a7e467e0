mod insert_and_remove;
mod malformed_event;
mod partition_migration;
mod properties;
mod search_exit;
