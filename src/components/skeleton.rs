use dioxus::prelude::*;
use dioxus_primitives::merge_attributes;

/// A length along one axis of a placeholder block
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dimension {
    Px(u32),
    Percent(u8),
}

impl Dimension {
    pub fn css(&self) -> String {
        match self {
            Dimension::Px(px) => format!("{}px", px),
            Dimension::Percent(pct) => format!("{}%", (*pct).min(100)),
        }
    }
}

/// Corner treatment of a placeholder block
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Rounding {
    None,
    #[default]
    Medium,
    Full,
}

impl Rounding {
    pub fn class(&self) -> &'static str {
        match self {
            Rounding::None => "rounded-none",
            Rounding::Medium => "rounded-md",
            Rounding::Full => "rounded-full",
        }
    }
}

/// Size and shape of a skeleton block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkeletonShape {
    pub width: Dimension,
    pub height: Dimension,
    pub rounding: Rounding,
}

impl SkeletonShape {
    /// A text-line style bar
    pub fn bar(width: Dimension, height_px: u32) -> Self {
        Self {
            width,
            height: Dimension::Px(height_px),
            rounding: Rounding::Medium,
        }
    }

    /// An avatar-style circle
    pub fn circle(size_px: u32) -> Self {
        Self {
            width: Dimension::Px(size_px),
            height: Dimension::Px(size_px),
            rounding: Rounding::Full,
        }
    }

    pub fn rounded(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn style(&self) -> String {
        format!("width: {}; height: {};", self.width.css(), self.height.css())
    }

    pub fn class(&self) -> String {
        format!("animate-pulse bg-muted {}", self.rounding.class())
    }
}

/// A pulsing placeholder block
///
/// Any global attribute (class, id, style, aria-*) passes through to the
/// rendered element and is merged with the shape's own.
#[component]
pub fn Skeleton(
    shape: SkeletonShape,
    #[props(extends = GlobalAttributes)] attributes: Vec<Attribute>,
) -> Element {
    let base = vec![
        Attribute::new("class", shape.class(), None, false),
        Attribute::new("style", shape.style(), None, false),
        Attribute::new("aria-hidden", "true", None, false),
    ];
    let merged = merge_attributes(vec![base, attributes]);

    rsx! {
        div {
            ..merged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_shape() {
        let shape = SkeletonShape::circle(64);
        assert_eq!(shape.style(), "width: 64px; height: 64px;");
        assert_eq!(shape.class(), "animate-pulse bg-muted rounded-full");
    }

    #[test]
    fn test_bar_shape() {
        let shape = SkeletonShape::bar(Dimension::Percent(75), 14);
        assert_eq!(shape.style(), "width: 75%; height: 14px;");
        assert_eq!(shape.rounding, Rounding::Medium);

        let square = shape.rounded(Rounding::None);
        assert!(square.class().ends_with("rounded-none"));
    }

    #[test]
    fn test_percent_is_capped() {
        assert_eq!(Dimension::Percent(150).css(), "100%");
    }

    #[test]
    fn test_renders_pulsing_block() {
        let html = dioxus_ssr::render_element(rsx! {
            Skeleton { shape: SkeletonShape::circle(40), id: "avatar-placeholder" }
        });
        assert!(html.contains("animate-pulse"));
        assert!(html.contains("width: 40px"));
        assert!(html.contains("avatar-placeholder"));
    }
}
