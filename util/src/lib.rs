pub mod grading_config;
