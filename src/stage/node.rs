//! Retained display tree the layers draw into and the renderer walks.

use std::{cell::RefCell, rc::Rc};

use tokio::time::Instant;

use crate::{
    assets::store::PreparedImage,
    foundation::core::{Point, Rgba8, Size},
};

/// 4x5 row-major color matrix applied to straight RGBA in `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [f64; 20]);

impl ColorMatrix {
    pub const IDENTITY: Self = Self::diag(1.0, 1.0, 1.0, 1.0);

    pub const fn diag(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self([
            r, 0.0, 0.0, 0.0, 0.0, //
            0.0, g, 0.0, 0.0, 0.0, //
            0.0, 0.0, b, 0.0, 0.0, //
            0.0, 0.0, 0.0, a, 0.0,
        ])
    }

    pub fn apply(&self, c: Rgba8) -> Rgba8 {
        let v = [
            c.r as f64 / 255.0,
            c.g as f64 / 255.0,
            c.b as f64 / 255.0,
            c.a as f64 / 255.0,
        ];
        let m = &self.0;
        let row = |i: usize| {
            let o = i * 5;
            let x = m[o] * v[0] + m[o + 1] * v[1] + m[o + 2] * v[2] + m[o + 3] * v[3] + m[o + 4];
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Rgba8 {
            r: row(0),
            g: row(1),
            b: row(2),
            a: row(3),
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeContent {
    Empty,
    Rect {
        size: Size,
        color: Rgba8,
    },
    Image {
        image: PreparedImage,
        size: Size,
    },
    /// Text box; only the first `visible_chars` characters are shown.
    Text {
        text: String,
        visible_chars: usize,
        font_size: f64,
        color: Rgba8,
        size: Size,
    },
    Model {
        costume: String,
        motion: Option<String>,
        expression: Option<String>,
        speaking: bool,
        size: Size,
    },
    /// Decorative particle/light animation. Persistent effects have no `progress` and are
    /// sampled by time since `started_at`; one-shot effects carry their progress in `0..=1`.
    Effect {
        name: String,
        started_at: Instant,
        progress: Option<f64>,
        size: Size,
    },
}

#[derive(Debug)]
struct Node {
    name: String,
    position: Point,
    scale: f64,
    alpha: f64,
    visible: bool,
    content: NodeContent,
    filter: Option<ColorMatrix>,
    children: Vec<DisplayNode>,
}

/// Shared handle to a display node. Cloning aliases the same node.
#[derive(Clone, Debug)]
pub struct DisplayNode(Rc<RefCell<Node>>);

impl DisplayNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_content(name, NodeContent::Empty)
    }

    pub fn with_content(name: impl Into<String>, content: NodeContent) -> Self {
        Self(Rc::new(RefCell::new(Node {
            name: name.into(),
            position: Point::ZERO,
            scale: 1.0,
            alpha: 1.0,
            visible: true,
            content,
            filter: None,
            children: Vec::new(),
        })))
    }

    pub fn ptr_eq(&self, other: &DisplayNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn position(&self) -> Point {
        self.0.borrow().position
    }

    pub fn set_position(&self, p: Point) {
        self.0.borrow_mut().position = p;
    }

    pub fn scale(&self) -> f64 {
        self.0.borrow().scale
    }

    pub fn set_scale(&self, s: f64) {
        self.0.borrow_mut().scale = s;
    }

    pub fn alpha(&self) -> f64 {
        self.0.borrow().alpha
    }

    pub fn set_alpha(&self, a: f64) {
        self.0.borrow_mut().alpha = a.clamp(0.0, 1.0);
    }

    pub fn visible(&self) -> bool {
        self.0.borrow().visible
    }

    pub fn set_visible(&self, v: bool) {
        self.0.borrow_mut().visible = v;
    }

    pub fn content(&self) -> NodeContent {
        self.0.borrow().content.clone()
    }

    pub fn set_content(&self, content: NodeContent) {
        self.0.borrow_mut().content = content;
    }

    pub fn update_content<R>(&self, f: impl FnOnce(&mut NodeContent) -> R) -> R {
        f(&mut self.0.borrow_mut().content)
    }

    pub fn filter(&self) -> Option<ColorMatrix> {
        self.0.borrow().filter
    }

    pub fn set_filter(&self, filter: Option<ColorMatrix>) {
        self.0.borrow_mut().filter = filter;
    }

    pub fn add_child(&self, child: DisplayNode) {
        self.0.borrow_mut().children.push(child);
    }

    pub fn remove_child(&self, child: &DisplayNode) {
        self.0
            .borrow_mut()
            .children
            .retain(|c| !c.ptr_eq(child));
    }

    pub fn remove_children(&self) {
        self.0.borrow_mut().children.clear();
    }

    pub fn children(&self) -> Vec<DisplayNode> {
        self.0.borrow().children.clone()
    }

    /// Depth-first search for a descendant (or self) named `name`.
    pub fn find(&self, name: &str) -> Option<DisplayNode> {
        if self.0.borrow().name == name {
            return Some(self.clone());
        }
        self.children().iter().find_map(|c| c.find(name))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/node.rs"]
mod tests;
