use crossterm::event::KeyCode;
use log::debug;
use ratatui::layout::{Position, Rect};

pub const EDITOR_MODAL: &str = "calModal";
pub const SHOPPING_MODAL: &str = "shoppingModal";

/// Layout hint used while an overlay is visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Single column, fields stacked top to bottom.
    Block,
    /// Wide box split into side-by-side columns.
    Flex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    pub id: &'static str,
    /// `None` while hidden.
    pub display: Option<DisplayMode>,
    pub aria_hidden: bool,
}

impl Overlay {
    /// Hides the overlay. Returns true if it was visible.
    fn hide(&mut self) -> bool {
        self.aria_hidden = true;
        let was_visible = self.display.take().is_some();
        if was_visible {
            debug!("event=modal_hide id={}", self.id);
        }
        was_visible
    }
}

/// Where a pointer press landed relative to a visible overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget<'a> {
    Background(&'a str),
    Content(&'a str),
}

/// Owns the visibility of a fixed set of named overlays. At most one is
/// visible at any time; unknown ids are ignored.
#[derive(Debug)]
pub struct ModalController {
    overlays: Vec<Overlay>,
}

impl ModalController {
    pub fn new(ids: &[&'static str]) -> Self {
        ModalController {
            overlays: ids
                .iter()
                .map(|&id| Overlay {
                    id,
                    display: None,
                    aria_hidden: true,
                })
                .collect(),
        }
    }

    /// Hides every overlay, then shows `id` with `mode`.
    pub fn show(&mut self, id: &str, mode: DisplayMode) {
        self.hide_all();
        if let Some(o) = self.overlays.iter_mut().find(|o| o.id == id) {
            o.display = Some(mode);
            o.aria_hidden = false;
            debug!("event=modal_show id={} mode={:?}", id, mode);
        }
    }

    pub fn hide(&mut self, id: &str) {
        if let Some(o) = self.overlays.iter_mut().find(|o| o.id == id) {
            o.hide();
        }
    }

    pub fn hide_all(&mut self) {
        for o in &mut self.overlays {
            o.hide();
        }
    }

    pub fn visible(&self) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.display.is_some())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.overlay(id).is_some_and(|o| o.display.is_some())
    }

    pub fn overlay(&self, id: &str) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// A press on an overlay's background dismisses it; presses on its
    /// content are left to the overlay.
    pub fn click(&mut self, target: ClickTarget) {
        if let ClickTarget::Background(id) = target {
            self.hide(id);
        }
    }

    /// The cancel control inside overlay `id`.
    pub fn close_control(&mut self, id: &str) {
        self.hide(id);
    }

    /// Returns true when the key was the global cancel key.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if code == KeyCode::Esc {
            self.hide_all();
            return true;
        }
        false
    }

    /// Classifies a press at `pos` against the visible overlay, if any.
    pub fn hit(&self, screen: Rect, pos: Position) -> Option<ClickTarget<'static>> {
        let o = self.visible()?;
        let mode = o.display?;
        if overlay_area(mode, screen).contains(pos) {
            Some(ClickTarget::Content(o.id))
        } else {
            Some(ClickTarget::Background(o.id))
        }
    }
}

/// Content rectangle of an overlay drawn with `mode`, centered in `screen`.
pub fn overlay_area(mode: DisplayMode, screen: Rect) -> Rect {
    let (pct, height) = match mode {
        DisplayMode::Block => (60, 9),
        DisplayMode::Flex => (80, 16),
    };
    let width = ((screen.width as u32 * pct / 100) as u16).max(20).min(screen.width);
    let height = height.min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ModalController {
        ModalController::new(&[EDITOR_MODAL, SHOPPING_MODAL, "loginModal"])
    }

    fn visible_count(m: &ModalController) -> usize {
        [EDITOR_MODAL, SHOPPING_MODAL, "loginModal"]
            .iter()
            .filter(|id| m.is_visible(id))
            .count()
    }

    #[test]
    fn test_all_hidden_initially() {
        let m = controller();
        assert!(m.visible().is_none());
        assert!(m.overlay(EDITOR_MODAL).unwrap().aria_hidden);
    }

    #[test]
    fn test_show_sets_mode_and_aria() {
        let mut m = controller();
        m.show(SHOPPING_MODAL, DisplayMode::Flex);
        let o = m.overlay(SHOPPING_MODAL).unwrap();
        assert_eq!(o.display, Some(DisplayMode::Flex));
        assert!(!o.aria_hidden);
        assert!(m.overlay(EDITOR_MODAL).unwrap().aria_hidden);
    }

    #[test]
    fn test_show_replaces_previous_overlay() {
        let mut m = controller();
        m.show(EDITOR_MODAL, DisplayMode::Block);
        m.show(SHOPPING_MODAL, DisplayMode::Flex);
        assert_eq!(visible_count(&m), 1);
        assert!(m.is_visible(SHOPPING_MODAL));
        assert!(m.overlay(EDITOR_MODAL).unwrap().aria_hidden);
    }

    #[test]
    fn test_show_unknown_still_hides_others() {
        let mut m = controller();
        m.show(EDITOR_MODAL, DisplayMode::Block);
        m.show("nope", DisplayMode::Block);
        assert_eq!(visible_count(&m), 0);
    }

    #[test]
    fn test_hide_only_affects_named_overlay() {
        let mut m = controller();
        m.show(EDITOR_MODAL, DisplayMode::Block);
        m.hide(SHOPPING_MODAL);
        assert!(m.is_visible(EDITOR_MODAL));
        m.hide(EDITOR_MODAL);
        assert!(!m.is_visible(EDITOR_MODAL));
        assert!(m.overlay(EDITOR_MODAL).unwrap().aria_hidden);
    }

    #[test]
    fn test_hide_unknown_is_noop() {
        let mut m = controller();
        m.show(EDITOR_MODAL, DisplayMode::Block);
        m.hide("nope");
        assert!(m.is_visible(EDITOR_MODAL));
    }

    #[test]
    fn test_escape_hides_everything() {
        let mut m = controller();
        m.show("loginModal", DisplayMode::Block);
        m.show(SHOPPING_MODAL, DisplayMode::Flex);
        assert!(m.handle_key(KeyCode::Esc));
        assert_eq!(visible_count(&m), 0);
        assert!(m.overlay(SHOPPING_MODAL).unwrap().aria_hidden);
    }

    #[test]
    fn test_overlay_hide_reports_only_visible() {
        let mut m = ModalController::new(&[EDITOR_MODAL, SHOPPING_MODAL]);
        m.show(SHOPPING_MODAL, DisplayMode::Flex);
        let hidden: Vec<&str> = m
            .overlays
            .iter_mut()
            .filter_map(|o| o.hide().then_some(o.id))
            .collect();
        assert_eq!(hidden, vec![SHOPPING_MODAL]);
        assert!(m.overlays.iter().all(|o| o.aria_hidden && o.display.is_none()));
    }

    #[test]
    fn test_other_keys_are_not_cancel() {
        let mut m = controller();
        m.show(EDITOR_MODAL, DisplayMode::Block);
        assert!(!m.handle_key(KeyCode::Enter));
        assert!(m.is_visible(EDITOR_MODAL));
    }

    #[test]
    fn test_at_most_one_visible_over_sequence() {
        let mut m = controller();
        let ids = [EDITOR_MODAL, SHOPPING_MODAL, "loginModal", "nope"];
        for step in 0..40usize {
            let id = ids[step % ids.len()];
            match step % 3 {
                0 => m.show(id, DisplayMode::Block),
                1 => m.show(ids[(step * 7) % ids.len()], DisplayMode::Flex),
                _ => m.hide(ids[(step * 5) % ids.len()]),
            }
            assert!(visible_count(&m) <= 1);
        }
        m.hide_all();
        assert_eq!(visible_count(&m), 0);
    }

    #[test]
    fn test_background_click_hides_overlay() {
        let mut m = controller();
        m.show(EDITOR_MODAL, DisplayMode::Block);
        m.click(ClickTarget::Content(EDITOR_MODAL));
        assert!(m.is_visible(EDITOR_MODAL));
        m.click(ClickTarget::Background(EDITOR_MODAL));
        assert!(!m.is_visible(EDITOR_MODAL));
    }

    #[test]
    fn test_close_control_hides_own_overlay() {
        let mut m = controller();
        m.show(SHOPPING_MODAL, DisplayMode::Flex);
        m.close_control(SHOPPING_MODAL);
        assert!(m.visible().is_none());
    }

    #[test]
    fn test_hit_classifies_inside_and_outside() {
        let mut m = controller();
        let screen = Rect::new(0, 0, 100, 40);
        assert_eq!(m.hit(screen, Position::new(50, 20)), None);

        m.show(EDITOR_MODAL, DisplayMode::Block);
        assert_eq!(
            m.hit(screen, Position::new(50, 20)),
            Some(ClickTarget::Content(EDITOR_MODAL))
        );
        assert_eq!(
            m.hit(screen, Position::new(0, 0)),
            Some(ClickTarget::Background(EDITOR_MODAL))
        );
    }

    #[test]
    fn test_overlay_area_is_centered_and_bounded() {
        let screen = Rect::new(0, 0, 100, 40);
        let block = overlay_area(DisplayMode::Block, screen);
        assert_eq!(block, Rect::new(20, 15, 60, 9));
        let flex = overlay_area(DisplayMode::Flex, screen);
        assert_eq!(flex, Rect::new(10, 12, 80, 16));

        let tiny = Rect::new(0, 0, 10, 5);
        let area = overlay_area(DisplayMode::Flex, tiny);
        assert!(area.width <= 10 && area.height <= 5);
    }
}
