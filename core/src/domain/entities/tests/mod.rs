mod refresh_token_tests;
