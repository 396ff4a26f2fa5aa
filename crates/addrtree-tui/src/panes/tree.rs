//! Department tree pane.

use addrtree_core::model::find_by_id;
use addrtree_core::{AppEvent, AppState, TreeNode};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tracing::warn;
use tui_tree_widget::{Tree, TreeItem, TreeState};

use crate::action::Action;
use crate::component::{Component, RenderCtx};

/// Convert department nodes into widget items keyed by node id.
pub fn tree_items(nodes: &[TreeNode]) -> std::io::Result<Vec<TreeItem<'static, String>>> {
    nodes.iter().map(tree_item).collect()
}

fn tree_item(node: &TreeNode) -> std::io::Result<TreeItem<'static, String>> {
    if node.is_leaf() {
        return Ok(TreeItem::new_leaf(node.id.clone(), node.label.clone()));
    }
    let children = tree_items(&node.children)?;
    TreeItem::new(node.id.clone(), node.label.clone(), children)
}

#[derive(Default)]
pub struct TreePane {
    items: Vec<TreeItem<'static, String>>,
    state: TreeState<String>,
    focused: bool,
    throbber: throbber_widgets_tui::ThrobberState,
}

impl TreePane {
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild(&mut self, nodes: &[TreeNode]) {
        self.items = tree_items(nodes).unwrap_or_else(|e| {
            warn!(error = %e, "could not build tree widget items");
            Vec::new()
        });
        self.state = TreeState::default();
        if let Some(first) = nodes.first() {
            self.state.select(vec![first.id.clone()]);
        }
    }

    /// The node under the cursor.
    fn current<'a>(&self, nodes: &'a [TreeNode]) -> Option<&'a TreeNode> {
        let id = self.state.selected().last().cloned()?;
        find_by_id(nodes, &id)
    }
}

impl Component for TreePane {
    fn handle_key_event(&mut self, key: KeyEvent, state: &AppState) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.key_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.key_down();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.state.key_left();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.state.key_right();
            }
            KeyCode::Char(' ') => {
                self.state.toggle_selected();
            }
            KeyCode::Enter => {
                let Some(node) = self.current(&state.tree) else {
                    return Ok(None);
                };
                if !node.is_leaf() {
                    self.state.toggle_selected();
                }
                return Ok(Some(AppEvent::NodeSelected(node.node_ref()).into()));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action, state: &AppState) -> Result<Option<Action>> {
        match action {
            Action::State(AppEvent::LoadSucceeded(_) | AppEvent::LoadFailed(_)) => {
                self.rebuild(&state.tree);
            }
            Action::Tick if state.tree_loading => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let theme = ctx.theme;
        let block = Block::default()
            .title(" Departments ")
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if ctx.state.tree_loading {
            let layout = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Loading departments...")
                .style(theme.text())
                .throbber_style(theme.key_hint_key());
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber.clone());
            return;
        }

        if self.items.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("No departments loaded", theme.muted())),
                inner,
            );
            return;
        }

        match Tree::new(&self.items) {
            Ok(tree) => {
                let tree = tree
                    .style(theme.text())
                    .highlight_style(theme.selected())
                    .highlight_symbol("▸ ");
                frame.render_stateful_widget(tree, inner, &mut self.state);
            }
            Err(e) => {
                warn!(error = %e, "tree widget rejected items");
                frame.render_widget(
                    Paragraph::new(Span::styled(e.to_string(), theme.error_banner())),
                    inner,
                );
            }
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use addrtree_core::build_tree;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn loaded(lines: &[&str]) -> (TreePane, AppState) {
        let mut state = AppState::new();
        let tree = build_tree(lines);
        state.reduce(AppEvent::LoadSucceeded(tree.clone()));
        let mut pane = TreePane::new();
        pane.update(&AppEvent::LoadSucceeded(tree).into(), &state).unwrap();
        (pane, state)
    }

    fn press(pane: &mut TreePane, state: &AppState, code: KeyCode) -> Option<Action> {
        pane.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), state)
            .unwrap()
    }

    #[test]
    fn items_mirror_roots() {
        let tree = build_tree(&["Sales Japan", "Sales US", "Engineering"]);
        assert_eq!(tree_items(&tree).unwrap().len(), 2);
    }

    #[test]
    fn enter_selects_first_root_after_load() {
        let (mut pane, state) = loaded(&["Sales Japan", "Engineering"]);
        let action = press(&mut pane, &state, KeyCode::Enter);
        assert_eq!(
            action,
            Some(Action::State(AppEvent::NodeSelected(state.tree[0].node_ref())))
        );
    }

    #[test]
    fn empty_directory_offers_sentinel() {
        let (mut pane, state) = loaded(&[]);
        let Some(Action::State(AppEvent::NodeSelected(node))) =
            press(&mut pane, &state, KeyCode::Enter)
        else {
            panic!("expected a node selection");
        };
        assert!(node.is_sentinel());
    }
}
