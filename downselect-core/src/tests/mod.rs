mod test_logdomain;
mod test_preflight;
