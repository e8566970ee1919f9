//! Shared test utilities for lead-engine unit tests.
