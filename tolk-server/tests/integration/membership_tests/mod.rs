mod test_disconnect_cleanup;
mod test_update_meta;
