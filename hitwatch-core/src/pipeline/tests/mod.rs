mod dispatch_tests;
mod run_tests;
mod test_helpers;
