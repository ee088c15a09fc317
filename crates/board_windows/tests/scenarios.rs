use std::{cell::RefCell, io::Cursor, rc::Rc};

use board_host::{
    ItemSet, JsonLinesRecordReader, JsonLinesRecordWriter, MemoryBoardDocument, MemoryTextLookup,
    NoopTextLookup,
};
use board_windows::{
    dispose_temporary_window, BoardFrame, ListDisplay, ListState, ObjectListKind, SavableWindow,
    SubWindowPreferences, WindowRect,
};
use pretty_assertions::assert_eq;

fn frame(doc: &MemoryBoardDocument) -> BoardFrame {
    BoardFrame::new(
        Rc::new(doc.clone()),
        Rc::new(MemoryTextLookup::from_entries([
            ("list_empty", "The list is empty"),
            ("layer_all", "all"),
            ("layer_inner", "inner"),
        ])),
        SubWindowPreferences::default(),
    )
}

#[test]
fn clearance_selection_survives_rule_reloads_by_position() {
    let doc = MemoryBoardDocument::default();
    doc.set_clearance_classes(["null", "default", "signal", "power"]);
    let mut frame = frame(&doc);
    frame
        .manual_rules_window()
        .clearance_mut()
        .choice_mut()
        .select_position(2)
        .expect("select signal");

    doc.set_clearance_classes(["null", "default", "signal"]);
    frame.refresh();
    assert_eq!(
        frame.manual_rules_window().clearance().choice().selected_position(),
        Some(2)
    );

    doc.set_clearance_classes(["null", "default"]);
    frame.refresh();
    assert_eq!(
        frame.manual_rules_window().clearance().choice().selected_position(),
        Some(1)
    );
}

#[test]
fn incompletes_filter_and_selection_push_endpoint_union() {
    let doc = MemoryBoardDocument::default();
    let endpoints: Vec<_> = (0..10).map(|_| doc.add_item(None, None)).collect();
    doc.add_incomplete("GND", (endpoints[0], "U3-4"), (endpoints[1], "C1-2"));
    doc.add_incomplete("VCC", (endpoints[2], "U1-8"), (endpoints[3], "C2-1"));
    doc.add_incomplete("SDA", (endpoints[4], "U3-5"), (endpoints[5], "R4-1"));
    doc.add_incomplete("SCL", (endpoints[6], "U2-6"), (endpoints[7], "R5-1"));
    doc.add_incomplete("RST", (endpoints[8], "U4-1"), (endpoints[9], "SW1-1"));

    let mut frame = frame(&doc);
    let window = frame.object_list_window(ObjectListKind::Incompletes);
    window.set_filter("U3");
    window.set_visible(true);

    let labels: Vec<&str> = window.entries().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["GND: U3-4 - C1-2", "SDA: U3-5 - R4-1"]);
    assert_eq!(window.state(), ListState::Filtered);

    window.select_indices([0, 1]);
    assert!(window.select_instances());
    assert_eq!(
        doc.selection(),
        ItemSet::from([endpoints[0], endpoints[1], endpoints[4], endpoints[5]])
    );
    assert_eq!(doc.zoom_requests(), 1);
}

#[test]
fn overlapping_package_and_component_selection_has_no_duplicates() {
    let doc = MemoryBoardDocument::default();
    let so8 = doc.add_package("SO8");
    let qfn = doc.add_package("QFN16");
    let u1 = doc.add_component("U1", so8);
    let u2 = doc.add_component("U2", so8);
    let u3 = doc.add_component("U3", qfn);
    let a = doc.add_item(Some(u1), None);
    let b = doc.add_item(Some(u2), None);
    let c = doc.add_item(Some(u3), None);

    let mut frame = frame(&doc);
    let packages = frame.object_list_window(ObjectListKind::Packages);
    packages.fill_list();
    packages.invert_selection();
    assert!(packages.select_instances());
    assert_eq!(doc.selection(), ItemSet::from([a, b, c]));
}

#[test]
fn empty_filter_result_uses_empty_message() {
    let doc = MemoryBoardDocument::default();
    let pkg = doc.add_package("SO8");
    doc.add_component("U1", pkg);

    let mut frame = frame(&doc);
    let window = frame.object_list_window(ObjectListKind::Components);
    window.set_filter("Q");
    window.fill_list();
    assert_eq!(
        window.display(),
        ListDisplay::Empty {
            message: "The list is empty".to_string()
        }
    );
    assert!(!window.select_instances());
    assert_eq!(doc.zoom_requests(), 0);
}

#[test]
fn frame_teardown_disposes_each_temporary_window_exactly_once() {
    let doc = MemoryBoardDocument::default();
    let mut frame = BoardFrame::new(
        Rc::new(doc.clone()),
        Rc::new(NoopTextLookup),
        SubWindowPreferences::default(),
    );
    let disposals = Rc::new(RefCell::new(Vec::new()));
    let mut opened = Vec::new();
    for n in 0..5 {
        let window = frame.open_temporary_window(format!("popover {n}"), WindowRect::default());
        let disposals = Rc::clone(&disposals);
        window
            .borrow_mut()
            .set_on_dispose(move |id| disposals.borrow_mut().push(id));
        opened.push(window.borrow().id());
    }
    // one popover closed by the user before teardown
    let closed_early = frame.registry().borrow().snapshot()[0].clone();
    dispose_temporary_window(&closed_early);

    let mut closed = frame.dispose();
    closed.sort();
    let mut seen = disposals.borrow().clone();
    seen.sort();
    opened.sort();

    assert_eq!(closed.len(), 4);
    assert_eq!(seen, opened);
    assert!(frame.registry().borrow().is_empty());
}

#[test]
fn session_file_round_trip_restores_every_permanent_window() {
    let doc = MemoryBoardDocument::default();
    doc.set_clearance_classes(["null", "default", "signal"]);
    doc.set_signal_layers(["Top", "In1", "In2", "Bottom"]);
    let pkg = doc.add_package("SO8");
    doc.add_component("U1", pkg);
    doc.add_component("U2", pkg);

    let mut source = frame(&doc);
    let rect = WindowRect {
        x: 400,
        y: 120,
        w: 260,
        h: 380,
    };
    {
        let components = source.object_list_window(ObjectListKind::Components);
        components.sub_window_mut().set_rect(rect);
        components.set_filter("U");
        components.set_visible(true);
        components.select_indices([1]);
    }
    source
        .manual_rules_window()
        .layer_mut()
        .choice_mut()
        .select_position(1)
        .expect("inner");

    let mut writer = JsonLinesRecordWriter::new(Vec::new());
    source.save_windows(&mut writer);
    let bytes = writer.into_inner().expect("flush session file");

    let mut target = frame(&doc);
    let mut reader = JsonLinesRecordReader::new(Cursor::new(bytes));
    assert!(target.load_windows(&mut reader));

    let components = target.object_list_window(ObjectListKind::Components);
    assert_eq!(components.sub_window().rect(), rect);
    assert!(components.sub_window().is_visible());
    assert_eq!(components.filter(), "U");
    assert_eq!(components.selected_indices(), vec![1]);
    assert!(!target
        .object_list_window(ObjectListKind::Packages)
        .sub_window()
        .is_visible());
    assert_eq!(target.manual_rules_window().layer().actionable_layers(), vec![1, 2]);
}
