//! Manual trace rules window: clearance class and layer selection for interactive routing.

use std::rc::Rc;

use board_host::{BoardDocument, SessionRecordStream, TextLookup};
use leptos::logging;

use crate::{
    choice::{ClearanceChoice, LayerChoice},
    frame::FrameServices,
    model::RulesSelectionRecord,
    persistence::{
        read_record, write_record, SavableSubWindow, SavableWindow, RULES_SELECTION_KEY,
    },
    window_manager::SubWindow,
};

pub struct ManualRulesWindow {
    base: SavableSubWindow,
    document: Rc<dyn BoardDocument>,
    text: Rc<dyn TextLookup>,
    clearance: ClearanceChoice,
    layer: LayerChoice,
}

impl ManualRulesWindow {
    pub fn new(services: &FrameServices) -> Self {
        let window = SubWindow::new(
            services.ids.next_id(),
            services.text.text("manual_rules_title"),
            services.preferences.default_rect,
        );
        Self {
            base: SavableSubWindow::new(window),
            clearance: ClearanceChoice::new(services.document.as_ref()),
            layer: LayerChoice::new(services.document.as_ref(), services.text.as_ref()),
            document: Rc::clone(&services.document),
            text: Rc::clone(&services.text),
        }
    }

    pub fn clearance(&self) -> &ClearanceChoice {
        &self.clearance
    }

    pub fn clearance_mut(&mut self) -> &mut ClearanceChoice {
        &mut self.clearance
    }

    pub fn layer(&self) -> &LayerChoice {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut LayerChoice {
        &mut self.layer
    }

    fn selection_record(&self) -> RulesSelectionRecord {
        RulesSelectionRecord {
            clearance_position: self.clearance.choice().selected_position().unwrap_or(0),
            layer_position: self.layer.choice().selected_position().unwrap_or(0),
        }
    }
}

impl SavableWindow for ManualRulesWindow {
    fn sub_window(&self) -> &SubWindow {
        self.base.sub_window()
    }

    fn sub_window_mut(&mut self) -> &mut SubWindow {
        self.base.sub_window_mut()
    }

    fn save(&self, stream: &mut dyn SessionRecordStream) {
        if let Err(err) = write_record(stream, RULES_SELECTION_KEY, &self.selection_record()) {
            logging::warn!("save rules selection failed: {err}");
        }
        self.base.save(stream);
    }

    fn load(&mut self, stream: &mut dyn SessionRecordStream) -> bool {
        let selection = match read_record::<RulesSelectionRecord>(stream, RULES_SELECTION_KEY) {
            Ok(selection) => Some(selection),
            Err(err) => {
                logging::warn!("load rules selection failed: {err}");
                None
            }
        };
        let state = self.base.read_view_state(stream);
        let (Some(selection), Some(state)) = (selection, state) else {
            return false;
        };

        self.base.apply_view_state(&state);
        self.clearance
            .choice_mut()
            .select_position_clamped(selection.clearance_position);
        self.layer
            .choice_mut()
            .select_position_clamped(selection.layer_position);
        true
    }

    fn refresh(&mut self) {
        self.clearance.adjust(self.document.as_ref());
        self.layer.adjust(self.document.as_ref(), self.text.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use board_host::{MemoryBoardDocument, MemoryRecordStream, NoopTextLookup};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{choice::LayerSelection, model::SubWindowPreferences};

    fn board() -> MemoryBoardDocument {
        let doc = MemoryBoardDocument::default();
        doc.set_clearance_classes(["null", "default", "signal", "power"]);
        doc.set_signal_layers(["Top", "In1", "In2", "Bottom"]);
        doc
    }

    fn services(doc: &MemoryBoardDocument) -> FrameServices {
        FrameServices::new(
            Rc::new(doc.clone()),
            Rc::new(NoopTextLookup),
            SubWindowPreferences::default(),
        )
    }

    #[test]
    fn refresh_adjusts_both_choices_to_new_domains() {
        let doc = board();
        let mut window = ManualRulesWindow::new(&services(&doc));
        window.clearance_mut().choice_mut().select_position(3).expect("power");
        window.layer_mut().choice_mut().select_position(1).expect("inner");

        doc.set_clearance_classes(["null", "default"]);
        doc.set_signal_layers(["Top", "Bottom"]);
        window.refresh();

        assert_eq!(window.clearance().selected_class(), Some(1));
        assert_eq!(window.layer().choice().selected_position(), Some(1));
        assert_eq!(window.layer().selected_layer(), Some(LayerSelection::Layer(0)));
    }

    #[test]
    fn selection_and_view_state_round_trip() {
        let doc = board();
        let mut source = ManualRulesWindow::new(&services(&doc));
        source.clearance_mut().choice_mut().select_position(2).expect("signal");
        source.layer_mut().choice_mut().select_position(3).expect("In1");
        source.sub_window_mut().set_visible(true);

        let mut stream = MemoryRecordStream::default();
        source.save(&mut stream);

        let mut target = ManualRulesWindow::new(&services(&doc));
        assert!(target.load(&mut stream));
        assert_eq!(target.clearance().selected_class(), Some(2));
        assert_eq!(target.layer().actionable_layers(), vec![1]);
        assert!(target.sub_window().is_visible());
    }

    #[test]
    fn truncated_stream_leaves_choices_untouched() {
        let doc = board();
        let source = ManualRulesWindow::new(&services(&doc));
        let mut stream = MemoryRecordStream::default();
        source.save(&mut stream);
        let _ = board_host::SessionRecordStream::read_record(&mut stream);

        let mut target = ManualRulesWindow::new(&services(&doc));
        target.clearance_mut().choice_mut().select_position(3).expect("power");
        assert!(!target.load(&mut stream));
        assert_eq!(target.clearance().selected_class(), Some(3));
    }
}
