mod test_candidates_wait_for_answer;
mod test_relay_routing;
