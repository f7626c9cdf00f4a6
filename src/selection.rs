mod mask;
mod polygon;
mod resolver;
mod software;
mod tool;

// Re-exports
pub use {
    mask::SelectionMask, polygon::SelectionPolygon, resolver::SelectionResolver,
    software::SoftwareMaskRenderer, tool::SelectionTool,
};
