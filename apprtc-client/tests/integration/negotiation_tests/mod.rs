mod test_candidate_buffering;
mod test_signaling_payload;
