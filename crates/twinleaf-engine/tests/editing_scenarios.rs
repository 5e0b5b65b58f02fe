mod common;

use common::{Editor, doc, list_item, paragraph};
use insta::assert_snapshot;
use twinleaf_engine::SyncError;
use twinleaf_engine::model::{EditOperation, InlineRun, Selection, Span, Transaction};
use twinleaf_engine::replica::{Expand, ReplicatedText};

mod basic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert() {
        let mut editor = Editor::new();

        editor.type_text("fox");

        assert_eq!(editor.spans(), doc(&[paragraph("fox")]));
        assert_snapshot!(editor.outline(), @r#"paragraph "fox""#);
    }

    #[test]
    fn insert_then_delete() {
        let mut editor = Editor::new();

        editor.type_text("fox");
        editor.backspace();
        editor.backspace();
        editor.backspace();

        assert_eq!(editor.spans(), doc(&[paragraph("")]));
        assert_snapshot!(editor.outline(), @r#"paragraph """#);
    }

    #[test]
    fn backspace_at_document_start_does_nothing() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox")]));
        editor.move_to_start();

        editor.backspace();

        assert_eq!(editor.spans(), doc(&[paragraph("fox")]));
        assert_eq!(editor.session.state().sync.version, 0);
    }
}

mod blocks {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_block() {
        let mut editor = Editor::new();
        editor.type_text("fox");

        editor.enter();

        assert_eq!(editor.spans(), doc(&[paragraph("fox"), paragraph("")]));
        assert_snapshot!(editor.outline(), @r#"
        paragraph "fox"
        paragraph ""
        "#);
    }

    #[test]
    fn create_block_and_type() {
        let mut editor = Editor::new();
        editor.type_text("fox");

        editor.enter();
        editor.type_text("rabbit");

        assert_eq!(
            editor.spans(),
            doc(&[paragraph("fox"), paragraph("rabbit")])
        );
    }

    #[test]
    fn enter_mid_block_moves_the_tail() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("foxrabbit")]));
        editor.set_caret(4);

        editor.enter();

        assert_eq!(
            editor.spans(),
            doc(&[paragraph("fox"), paragraph("rabbit")])
        );
        assert_eq!(editor.selection().head, 6);
    }

    #[test]
    fn backspace_at_block_start_joins_blocks() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("a"), paragraph("b")]));
        editor.set_caret(4);

        editor.backspace();

        assert_eq!(editor.spans(), doc(&[paragraph("ab")]));
        assert_snapshot!(editor.outline(), @r#"paragraph "ab""#);
    }

    #[test]
    fn deleting_across_a_boundary_merges_blocks() {
        // fo|x / fo|x
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox"), paragraph("fox")]));
        editor.set_selection(Selection::range(3, 8));

        editor.backspace();

        assert_eq!(editor.spans(), doc(&[paragraph("fox")]));
        assert_snapshot!(editor.outline(), @r#"paragraph "fox""#);
    }

    #[test]
    fn typing_over_a_cross_block_selection() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox"), paragraph("rabbit")]));
        editor.set_selection(Selection::range(2, 8));

        editor.type_text("-");

        assert_eq!(editor.spans(), doc(&[paragraph("f-bbit")]));
    }
}

mod lists {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paragraph_to_list_item_without_neighbours() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox"), paragraph("rabbit")]));
        editor.move_to_start();

        editor.toggle_list();

        assert_eq!(
            editor.spans(),
            doc(&[list_item("fox"), paragraph("rabbit")])
        );
        assert_snapshot!(editor.outline(), @r#"
        list
          list-item "fox"
        paragraph "rabbit"
        "#);
    }

    #[test]
    fn paragraph_joins_preceding_list() {
        let mut editor = Editor::from_spans(&doc(&[list_item("fox"), paragraph("rabbit")]));
        editor.set_caret(8);

        editor.toggle_list();

        assert_snapshot!(editor.outline(), @r#"
        list
          list-item "fox"
          list-item "rabbit"
        "#);
    }

    #[test]
    fn paragraph_joins_following_list() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox"), list_item("rabbit")]));
        editor.move_to_start();

        editor.toggle_list();

        assert_snapshot!(editor.outline(), @r#"
        list
          list-item "fox"
          list-item "rabbit"
        "#);
    }

    #[test]
    fn paragraph_between_lists_merges_them() {
        let mut editor = Editor::from_spans(&doc(&[
            list_item("fox"),
            paragraph("rabbit"),
            list_item("owl"),
        ]));
        editor.set_caret(8);

        editor.toggle_list();

        assert_eq!(
            editor.spans(),
            doc(&[list_item("fox"), list_item("rabbit"), list_item("owl")])
        );
        assert_snapshot!(editor.outline(), @r#"
        list
          list-item "fox"
          list-item "rabbit"
          list-item "owl"
        "#);
    }

    #[test]
    fn list_item_to_paragraph() {
        let mut editor = Editor::from_spans(&doc(&[list_item("fox"), paragraph("rabbit")]));
        editor.move_to_start();

        editor.toggle_list();

        assert_eq!(
            editor.spans(),
            doc(&[paragraph("fox"), paragraph("rabbit")])
        );
        assert_snapshot!(editor.outline(), @r#"
        paragraph "fox"
        paragraph "rabbit"
        "#);
    }

    #[test]
    fn middle_item_to_paragraph_splits_list() {
        let mut editor = Editor::from_spans(&doc(&[
            list_item("fox"),
            list_item("rabbit"),
            list_item("owl"),
        ]));
        editor.set_caret(7);

        editor.toggle_list();

        assert_snapshot!(editor.outline(), @r#"
        list
          list-item "fox"
        paragraph "rabbit"
        list
          list-item "owl"
        "#);
    }

    #[test]
    fn split_list_item() {
        let mut editor = Editor::from_spans(&doc(&[list_item("fox")]));
        editor.move_to_end();

        editor.enter();

        assert_eq!(editor.spans(), doc(&[list_item("fox"), list_item("")]));
        assert_snapshot!(editor.outline(), @r#"
        list
          list-item "fox"
          list-item ""
        "#);
    }

    #[test]
    fn typing_into_new_list_item() {
        let mut editor = Editor::from_spans(&doc(&[list_item("fox")]));
        editor.move_to_end();

        editor.enter();
        editor.type_text("owl");

        assert_eq!(editor.spans(), doc(&[list_item("fox"), list_item("owl")]));
    }
}

mod marks {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn select_and_add_bold() {
        let mut editor = Editor::new();
        editor.type_text("fox");
        editor.select_all();

        editor.toggle_mark("strong");

        assert_eq!(
            editor.spans(),
            vec![
                Span::block("paragraph"),
                Span::marked_text("fox", ["strong"]),
            ]
        );
        assert_snapshot!(editor.outline(), @r#"paragraph "fox"[strong]"#);
    }

    #[test]
    fn select_and_remove_bold() {
        let mut editor = Editor::new();
        editor.type_text("fox");
        editor.select_all();
        editor.toggle_mark("strong");

        editor.select_all();
        editor.toggle_mark("strong");

        assert_eq!(editor.spans(), doc(&[paragraph("fox")]));
        assert_snapshot!(editor.outline(), @r#"paragraph "fox""#);
    }

    #[test]
    fn bold_with_empty_selection_then_type() {
        let mut editor = Editor::new();

        editor.toggle_mark("strong");
        editor.type_text("fox");

        assert_eq!(
            editor.spans(),
            vec![
                Span::block("paragraph"),
                Span::marked_text("fox", ["strong"]),
            ]
        );
        assert_snapshot!(editor.outline(), @r#"paragraph "fox"[strong]"#);
    }

    #[test]
    fn disable_bold_at_end_then_type() {
        let mut editor = Editor::new();
        editor.type_text("fox");
        editor.select_all();
        editor.toggle_mark("strong");
        editor.move_to_end();

        editor.toggle_mark("strong");
        editor.type_text("a");

        assert_eq!(
            editor.spans(),
            vec![
                Span::block("paragraph"),
                Span::marked_text("fox", ["strong"]),
                Span::text("a"),
            ]
        );
        assert_snapshot!(editor.outline(), @r#"paragraph "fox"[strong] "a""#);
    }

    #[test]
    fn typing_after_bold_keeps_bold() {
        let mut editor = Editor::new();
        editor.toggle_mark("strong");
        editor.type_text("fox");

        editor.type_text("y");

        assert_eq!(
            editor.spans(),
            vec![
                Span::block("paragraph"),
                Span::marked_text("foxy", ["strong"]),
            ]
        );
    }

    #[test]
    fn deleting_drops_a_pending_mark() {
        let mut editor = Editor::new();
        editor.type_text("fox");

        editor.toggle_mark("strong");
        editor.backspace();
        editor.type_text("x");

        assert_eq!(editor.spans(), doc(&[paragraph("fox")]));
        assert_snapshot!(editor.outline(), @r#"paragraph "fox""#);
    }

    #[test]
    fn links_do_not_grow_when_typing_after_them() {
        let mut editor = Editor::new();
        editor.type_text("fox");
        editor.select_all();
        editor.toggle_mark("link");
        editor.move_to_end();

        editor.toggle_mark("link");
        editor.type_text("y");

        assert_eq!(
            editor.spans(),
            vec![
                Span::block("paragraph"),
                Span::marked_text("fox", ["link"]),
                Span::text("y"),
            ]
        );
    }
}

mod remote {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn foreign_text_shows_up_after_reconcile() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox")]));

        editor.foreign_edit(|text| text.splice(4, 0, " and rabbit"));
        editor.session.reconcile().unwrap();

        assert_snapshot!(editor.outline(), @r#"paragraph "fox and rabbit""#);
        assert_eq!(editor.session.state().sync.version, 1);
    }

    #[test]
    fn foreign_list_item_is_wrapped() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox")]));

        editor.foreign_edit(|text| {
            text.split_block(4, "list-item")?;
            text.splice(5, 0, "owl")?;
            text.update_block_type(0, "list-item")
        });
        editor.session.reconcile().unwrap();

        assert_snapshot!(editor.outline(), @r#"
        list
          list-item "fox"
          list-item "owl"
        "#);
    }

    #[test]
    fn foreign_bold_is_applied() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox"), paragraph("owl")]));

        editor.foreign_edit(|text| text.mark(2..7, "strong", Expand::After));
        editor.session.reconcile().unwrap();

        assert_snapshot!(editor.outline(), @r#"
        paragraph "f" "ox"[strong]
        paragraph "ow"[strong] "l"
        "#);
    }

    #[test]
    fn local_edit_on_stale_heads_is_rejected() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox")]));
        editor.foreign_edit(|text| text.splice(1, 0, "a "));
        let before = editor.session.state().clone();

        let tx = Transaction::new(editor.doc().clone())
            .step(EditOperation::insert(4, [InlineRun::plain("!")]));
        let result = editor.session.dispatch(tx);

        assert!(matches!(result, Err(SyncError::StaleHeads { .. })));
        assert_eq!(editor.session.state(), &before);

        editor.session.reconcile().unwrap();
        assert_snapshot!(editor.outline(), @r#"paragraph "a fox""#);
    }

    #[test]
    fn reconcile_without_changes_is_a_no_op() {
        let mut editor = Editor::from_spans(&doc(&[paragraph("fox")]));
        let before = editor.session.state().clone();

        editor.session.reconcile().unwrap();

        assert_eq!(editor.session.state(), &before);
        assert_eq!(editor.session.replica().heads(), before.sync.last_heads);
    }
}
