mod end;
mod model_step;
mod tool_step;

pub use end::End;
pub use model_step::ModelStep;
pub use tool_step::ToolStep;
