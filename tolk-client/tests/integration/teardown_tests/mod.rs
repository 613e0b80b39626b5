mod test_shutdown;
mod test_unanswered_offer;
