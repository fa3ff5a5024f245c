//! Renderable node trees and the mounted surface they are shown on.
//!
//! Views build [`Node`] trees as a pure function of their state. The
//! [`Surface`] holds what is currently mounted: the main tree, an optional
//! modal overlay, and keyboard focus. Partial updates go through a fixed set
//! of named [`Region`]s instead of arbitrary subtree replacement.

use std::collections::BTreeMap;

use crate::views::Action;

/// Attribute that marks a patchable subtree.
pub const REGION_ATTR: &str = "data-region";

/// Events a node can bind an [`Action`] to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click,
    Input,
    Change,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub trigger: Trigger,
    pub action: Action,
}

/// Subtrees that can be replaced without re-rendering the whole view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Summary,
    Helper,
    FeelingChoice,
}

impl Region {
    pub fn name(&self) -> &'static str {
        match self {
            Region::Summary => "summary",
            Region::Helper => "helper",
            Region::FeelingChoice => "feeling",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(Node),
    Text(String),
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Element(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

/// An element: tag, attributes, event bindings and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub bindings: Vec<Binding>,
    pub children: Vec<Child>,
}

/// Build an element from a tag, attribute pairs and children.
pub fn el<C: Into<Child>>(
    tag: &str,
    attrs: &[(&str, &str)],
    children: impl IntoIterator<Item = C>,
) -> Node {
    Node {
        tag: tag.to_string(),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        bindings: Vec::new(),
        children: children.into_iter().map(Into::into).collect(),
    }
}

impl Node {
    pub fn new(tag: &str) -> Self {
        el::<Child>(tag, &[], [])
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn region(self, region: Region) -> Self {
        self.attr(REGION_ATTR, region.name())
    }

    /// Set a boolean attribute only when `on` is true.
    pub fn flag(self, key: &str, on: bool) -> Self {
        if on { self.attr(key, key) } else { self }
    }

    pub fn on(mut self, trigger: Trigger, action: Action) -> Self {
        self.bindings.push(Binding { trigger, action });
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn id_attr(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn binding(&self, trigger: Trigger) -> Option<&Action> {
        self.bindings
            .iter()
            .find(|b| b.trigger == trigger)
            .map(|b| &b.action)
    }

    /// Inputs and buttons with an id can hold keyboard focus.
    pub fn is_focusable(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "button" | "textarea") && self.id_attr().is_some()
    }

    /// Element children only, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| match c {
            Child::Element(node) => Some(node),
            Child::Text(_) => None,
        })
    }

    /// Every element in document order, starting with `self`.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = vec![self];
        for child in self.elements() {
            out.extend(child.descendants());
        }
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.descendants()
            .into_iter()
            .find(|n| n.id_attr() == Some(id))
    }

    fn find_mut(&mut self, pred: &dyn Fn(&Node) -> bool) -> Option<&mut Node> {
        if pred(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Child::Element(node) = child {
                if let Some(found) = node.find_mut(pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_region(&self, region: Region) -> Option<&Node> {
        self.descendants()
            .into_iter()
            .find(|n| n.get_attr(REGION_ATTR) == Some(region.name()))
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(node) => out.push_str(&node.text_content()),
            }
        }
        out
    }
}

/// Keys the surface and shell interpret themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    BackTab,
    Escape,
}

/// The mounted document: main tree, modal overlay, and focus.
#[derive(Debug, Default)]
pub struct Surface {
    root: Option<Node>,
    overlay: Option<Node>,
    focus: Option<String>,
    mounts: usize,
    patches: usize,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the main tree.
    ///
    /// With `focus` set, that element takes focus. Without it focus stays
    /// where it was if that element still exists.
    pub fn mount(&mut self, root: Node, focus: Option<&str>) {
        self.root = Some(root);
        self.mounts += 1;
        match focus {
            Some(id) => self.focus = Some(id.to_string()),
            None => {
                if let Some(current) = self.focus.clone() {
                    if self.find(&current).is_none() {
                        self.focus = None;
                    }
                }
            }
        }
    }

    /// Replace one named region of the main tree. Focus is left alone.
    pub fn patch_region(&mut self, region: Region, node: Node) -> bool {
        let Some(root) = self.root.as_mut() else {
            return false;
        };
        let name = region.name();
        match root.find_mut(&|n| n.get_attr(REGION_ATTR) == Some(name)) {
            Some(slot) => {
                *slot = node;
                self.patches += 1;
                true
            }
            None => false,
        }
    }

    /// Show a modal overlay and move focus into it.
    pub fn set_overlay(&mut self, overlay: Node, focus: &str) {
        self.overlay = Some(overlay);
        self.focus = Some(focus.to_string());
    }

    /// Remove the overlay, handing focus back to `restore`.
    pub fn clear_overlay(&mut self, restore: Option<String>) {
        self.overlay = None;
        self.focus = restore.filter(|id| self.find(id).is_some());
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn overlay(&self) -> Option<&Node> {
        self.overlay.as_ref()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn focused_node(&self) -> Option<&Node> {
        self.focus.as_deref().and_then(|id| self.find(id))
    }

    /// Look an element up, overlay first.
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.overlay
            .as_ref()
            .and_then(|o| o.find_by_id(id))
            .or_else(|| self.root.as_ref().and_then(|r| r.find_by_id(id)))
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        let pred = |n: &Node| n.id_attr() == Some(id);
        if let Some(found) = self.overlay.as_mut().and_then(|o| o.find_mut(&pred)) {
            return Some(found);
        }
        self.root.as_mut().and_then(|r| r.find_mut(&pred))
    }

    /// Move focus to an element, unless an overlay traps focus elsewhere.
    pub fn focus(&mut self, id: &str) -> bool {
        let allowed = self.focus_ring().iter().any(|f| f == id);
        if allowed {
            self.focus = Some(id.to_string());
        }
        allowed
    }

    /// Focusable ids in order. While an overlay is shown only its own
    /// elements are reachable.
    pub fn focus_ring(&self) -> Vec<String> {
        let tree = match (&self.overlay, &self.root) {
            (Some(overlay), _) => overlay,
            (None, Some(root)) => root,
            (None, None) => return Vec::new(),
        };
        tree.descendants()
            .into_iter()
            .filter(|n| n.is_focusable())
            .filter_map(|n| n.id_attr().map(str::to_string))
            .collect()
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(-1);
    }

    fn step_focus(&mut self, delta: isize) {
        let ring = self.focus_ring();
        if ring.is_empty() {
            self.focus = None;
            return;
        }
        let len = ring.len() as isize;
        let next = match self.focus.as_ref().and_then(|f| ring.iter().position(|r| r == f)) {
            Some(pos) => (pos as isize + delta).rem_euclid(len),
            None if delta > 0 => 0,
            None => len - 1,
        };
        self.focus = Some(ring[next as usize].clone());
    }

    /// Reflect typed text into an input's `value`, as the user sees it.
    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        match self.find_mut(id) {
            Some(node) => {
                node.attrs.insert("value".to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    /// Check one radio and uncheck the rest of its `name` group.
    pub fn check_radio(&mut self, id: &str) -> bool {
        let Some(group) = self.find(id).and_then(|n| n.get_attr("name")).map(str::to_string)
        else {
            return false;
        };
        let Some(root) = self.root.as_mut() else {
            return false;
        };
        check_in_group(root, &group, id);
        true
    }

    pub fn mount_count(&self) -> usize {
        self.mounts
    }

    pub fn patch_count(&self) -> usize {
        self.patches
    }
}

fn check_in_group(node: &mut Node, group: &str, id: &str) {
    if node.tag == "input" && node.get_attr("name") == Some(group) {
        if node.id_attr() == Some(id) {
            node.attrs.insert("checked".into(), "checked".into());
        } else {
            node.attrs.remove("checked");
        }
    }
    for child in &mut node.children {
        if let Child::Element(el) = child {
            check_in_group(el, group, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Node {
        Node::new("form")
            .child(Node::new("input").id("title").attr("value", ""))
            .child(
                Node::new("div")
                    .region(Region::Summary)
                    .child(el("p", &[], ["old"])),
            )
            .child(Node::new("button").id("done").child("Done"))
    }

    #[test]
    fn el_builds_attributes_and_text() {
        let node = el("p", &[("class", "helper-message")], ["Well ", "done"]);
        assert_eq!(node.get_attr("class"), Some("helper-message"));
        assert_eq!(node.text_content(), "Well done");
    }

    #[test]
    fn mount_with_focus_then_without_keeps_it() {
        let mut surface = Surface::new();
        surface.mount(form(), Some("title"));
        assert_eq!(surface.focused(), Some("title"));

        surface.focus("done");
        surface.mount(form(), None);
        assert_eq!(surface.focused(), Some("done"));
        assert_eq!(surface.mount_count(), 2);
    }

    #[test]
    fn focus_is_dropped_when_element_disappears() {
        let mut surface = Surface::new();
        surface.mount(form(), Some("done"));
        surface.mount(Node::new("form"), None);
        assert_eq!(surface.focused(), None);
    }

    #[test]
    fn patch_replaces_only_the_region() {
        let mut surface = Surface::new();
        surface.mount(form(), Some("title"));
        surface.set_value("title", "typed");

        let replacement = Node::new("div")
            .region(Region::Summary)
            .child(el("p", &[], ["new"]));
        assert!(surface.patch_region(Region::Summary, replacement));

        let root = surface.root().unwrap();
        assert_eq!(root.find_region(Region::Summary).unwrap().text_content(), "new");
        assert_eq!(root.find_by_id("title").unwrap().get_attr("value"), Some("typed"));
        assert_eq!(surface.focused(), Some("title"));
        assert_eq!(surface.patch_count(), 1);
        assert!(!surface.patch_region(Region::Helper, Node::new("div")));
    }

    #[test]
    fn overlay_traps_focus() {
        let mut surface = Surface::new();
        surface.mount(form(), Some("title"));
        let overlay = Node::new("div")
            .child(Node::new("button").id("cancel"))
            .child(Node::new("button").id("remove"));
        surface.set_overlay(overlay, "remove");

        surface.focus_next();
        assert_eq!(surface.focused(), Some("cancel"));
        surface.focus_prev();
        assert_eq!(surface.focused(), Some("remove"));
        assert!(!surface.focus("title"));

        surface.clear_overlay(Some("title".into()));
        assert_eq!(surface.focused(), Some("title"));
        assert!(surface.focus("done"));
    }

    #[test]
    fn radios_check_exclusively() {
        let group = Node::new("fieldset")
            .child(Node::new("input").id("a").attr("name", "feeling").attr("checked", "checked"))
            .child(Node::new("input").id("b").attr("name", "feeling"));
        let mut surface = Surface::new();
        surface.mount(group, None);

        assert!(surface.check_radio("b"));
        assert!(!surface.find("a").unwrap().has_attr("checked"));
        assert!(surface.find("b").unwrap().has_attr("checked"));
    }
}
