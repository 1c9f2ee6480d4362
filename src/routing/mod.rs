/// Module containing the route table and its builder
pub mod router;
/// Module compiling path templates such as `/post/:id`
pub mod template;
