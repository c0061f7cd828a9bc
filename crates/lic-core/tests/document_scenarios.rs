//! 文档生成与结构修改的端到端场景

use lic_core::prelude::*;
use lic_core::state::DEFAULT_PAGE_SIZE;
use std::collections::HashSet;

/// 固定尺寸，方便断言布局结果
#[derive(Debug, Clone, Copy)]
struct FixedSizes;

impl SizeProvider for FixedSizes {
    fn measure_step_picture(&self, _model: &Model, _step: &Step) -> Size {
        Size::new(100.0, 80.0)
    }

    fn measure_part_icon(&self, _part: &Part) -> Size {
        Size::new(40.0, 30.0)
    }

    fn measure_label(&self, _font: &str, text: &str) -> Size {
        Size::new(10.0 * text.chars().count() as f64, 12.0)
    }
}

fn brick(color: i32) -> Part {
    Part::new("3001.dat", color)
}

fn plate() -> Part {
    Part::new("3020.dat", 1)
}

/// 两步：两块相同的砖，然后一块板
fn two_step_model() -> ModelFile {
    ModelFile::new(
        Model::new("tower.ldr")
            .with_parts([brick(4), brick(4), plate()])
            .with_steps([vec![0, 1], vec![2]]),
    )
}

/// 三步，每步一个零件
fn three_step_model() -> ModelFile {
    ModelFile::new(
        Model::new("small_house.ldr")
            .with_parts([brick(4), brick(14), plate()])
            .with_steps([vec![0], vec![1], vec![2]]),
    )
}

fn page_numbers(doc: &Document<ModelFile, FixedSizes>) -> Vec<u32> {
    doc.state()
        .pages
        .iter()
        .filter_map(|p| p.number)
        .collect()
}

#[test]
fn test_initial_pages_for_two_steps() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    let pages = doc.add_initial_pages(&[]).unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(page_numbers(&doc), vec![1, 2]);
    let step_numbers: Vec<_> = doc.state().steps.iter().map(|s| s.number).collect();
    assert_eq!(step_numbers, vec![Some(0), Some(1)]);

    let first = &doc.state().steps[0];
    assert_eq!(first.parts, vec![0, 1]);
    let pli = doc.state().pli(first.pli_id.unwrap()).unwrap();
    assert_eq!(pli.pli_items.len(), 1);
    let item = doc.state().pli_item(pli.pli_items[0]).unwrap();
    assert_eq!(item.quantity, 2);
    assert_eq!(item.part_numbers, vec![0, 1]);
    assert!(item.quantity_label.is_some());

    // 每页一个页码标签，每步一个步骤号、步骤图与零件表
    assert_eq!(doc.state().number_labels.len(), 4);
    assert_eq!(doc.state().csis.len(), 2);
    assert_eq!(doc.state().plis.len(), 2);
}

#[test]
fn test_submodel_pages_come_first() {
    let wheel = Model::new("wheel.ldr")
        .with_parts([Part::new("4624.dat", 15), Part::new("3641.dat", 0)])
        .with_steps([vec![0], vec![1]]);
    let main = Model::new("car.ldr")
        .with_parts([plate(), Part::new("wheel.ldr", 16)])
        .with_steps([vec![0, 1]]);
    let mut doc = Document::new(ModelFile::new(main).with_submodel(wheel), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();

    let submodels: Vec<_> = doc.state().steps.iter().map(|s| s.submodel.clone()).collect();
    assert_eq!(submodels, vec![vec![1], vec![1], vec![]]);
    assert_eq!(page_numbers(&doc), vec![1, 2, 3]);

    let usage = doc.submodels();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].filename, "wheel.ldr");
    assert_eq!(usage[0].quantity, 1);
}

#[test]
fn test_ids_are_unique_per_type() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let step = doc.state().steps[0].lookup();
    let callout = doc.add_callout(step).unwrap();
    doc.add_step(AddStepOptions::new(callout)).unwrap();

    for item_type in ItemType::ALL {
        let ids: Vec<_> = doc.state().nodes(item_type).iter().map(|n| n.id()).collect();
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len(), "duplicate ids for {item_type}");
    }
}

#[test]
fn test_move_part_splits_pli_item() {
    let model = ModelFile::new(
        Model::new("stack.ldr")
            .with_parts([brick(4), brick(4), brick(4), plate()])
            .with_steps([vec![0, 1, 2], vec![3]]),
    );
    let mut doc = Document::new(model, FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let src = doc.state().steps[0].lookup();
    let dest = doc.state().steps[1].lookup();

    let moved = doc.move_part_to_step(MovePartOptions {
        part_id: 1,
        src_step: src,
        dest_step: dest,
    });
    assert_eq!(moved, Some(dest));
    assert_eq!(doc.state().step(src.id).unwrap().parts, vec![0, 2]);
    assert_eq!(doc.state().step(dest.id).unwrap().parts, vec![1, 3]);

    let src_pli = doc.state().step(src.id).unwrap().pli_id.unwrap();
    let src_items = &doc.state().pli(src_pli).unwrap().pli_items;
    let remaining = doc.state().pli_item(src_items[0]).unwrap();
    assert_eq!(remaining.quantity, 2);
    assert_eq!(remaining.part_numbers, vec![0, 2]);
    let remaining_id = remaining.id;

    let dest_pli = doc.state().step(dest.id).unwrap().pli_id.unwrap();
    let dest_items = &doc.state().pli(dest_pli).unwrap().pli_items;
    assert_eq!(dest_items.len(), 2);
    let split = doc.state().pli_item(dest_items[1]).unwrap();
    assert!(split.matches("3001.dat", 4));
    assert_eq!(split.part_numbers, vec![1]);
    assert!(split.quantity_label.is_some());

    // 移回时并入原来的项
    doc.move_part_to_step(MovePartOptions {
        part_id: 1,
        src_step: dest,
        dest_step: src,
    });
    let merged = doc.state().pli_item(remaining_id).unwrap();
    assert_eq!(merged.quantity, 3);
    assert_eq!(doc.state().pli(dest_pli).unwrap().pli_items.len(), 1);
}

#[test]
fn test_quantity_matches_part_numbers() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let src = doc.state().steps[0].lookup();
    let dest = doc.state().steps[1].lookup();
    doc.move_part_to_step(MovePartOptions {
        part_id: 0,
        src_step: src,
        dest_step: dest,
    });

    for item in &doc.state().pli_items {
        assert_eq!(item.quantity as usize, item.part_numbers.len());
    }
}

#[test]
fn test_layout_is_idempotent() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions {
        steps_per_page: 2,
        include_title_page: true,
        ..ImportOptions::default()
    })
    .unwrap();
    let before = doc.state().clone();
    assert_eq!(doc.layout_all(), 3);
    assert_eq!(doc.state(), &before);
}

#[test]
fn test_single_step_layout() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let state = doc.state();
    let step = &state.steps[0];

    let bounds = step.bounds.unwrap();
    assert_eq!(bounds, Rect::new(20.0, 20.0, 860.0, 660.0));

    let csi = state.csi(step.csi_id.unwrap()).unwrap().bounds.unwrap();
    assert_eq!(csi, Rect::new(380.0, 290.0, 100.0, 80.0));

    // 零件表高度 = 边距 + (图标高 - 偏移 + 标签高) + 边距
    let margin = doc.config().pli_margin;
    let pli = state.pli(step.pli_id.unwrap()).unwrap().bounds.unwrap();
    assert_eq!(pli.height, margin + (30.0 - 5.0 + 12.0) + margin);
    let label = state.number_label(step.number_label.unwrap()).unwrap();
    assert_eq!(label.bounds.unwrap().y, pli.height + 20.0);

    let page_label = state.number_label(state.pages[0].number_label.unwrap()).unwrap();
    let size = DEFAULT_PAGE_SIZE;
    assert_eq!(
        page_label.bounds.unwrap(),
        Rect::new(size.width - 20.0 - 10.0, size.height - 20.0 - 12.0, 10.0, 12.0)
    );
    assert!(state.pages.iter().all(|p| !p.needs_layout));
}

#[test]
fn test_hidden_plis_get_empty_bounds() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions {
        include_pli: false,
        ..ImportOptions::default()
    })
    .unwrap();
    let state = doc.state();
    assert!(!state.plis_visible);
    assert!(state.plis.iter().all(|p| p.bounds == Some(Rect::ZERO)));
    let step = &state.steps[0];
    let label = state.number_label(step.number_label.unwrap()).unwrap();
    assert_eq!(label.bounds.unwrap().y, 0.0);
}

#[test]
fn test_move_step_keeps_parent_links() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let step = doc.state().steps[1].lookup();
    let old_page = doc.state().pages[1].lookup();
    let next_page = doc.state().pages[2].lookup();

    assert_eq!(doc.move_step_to_next_page(step), Some(next_page));
    let state = doc.state();
    assert_eq!(state.step(step.id).unwrap().parent, Some(next_page));
    assert!(state.page(old_page.id).unwrap().steps.is_empty());
    assert_eq!(state.page(next_page.id).unwrap().steps[0], step.id);

    // 每个条目都出现在父条目的子条目列表中
    for s in &state.steps {
        let parent = s.parent.unwrap();
        let page = state.page(parent.id).unwrap();
        assert!(page.steps.contains(&s.id));
    }
}

#[test]
fn test_delete_page_requires_empty_page() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let page = doc.state().pages[1].lookup();
    let step = doc.state().steps[1].lookup();

    assert!(!doc.delete_page(page));
    assert_eq!(doc.state().pages.len(), 3);

    let first = doc.state().pages[0].lookup();
    assert_eq!(doc.move_step_to_previous_page(step), Some(first));
    assert_eq!(doc.state().page(first.id).unwrap().steps.len(), 2);

    assert!(doc.delete_page(page));
    assert_eq!(doc.state().pages.len(), 2);
    assert_eq!(page_numbers(&doc), vec![1, 2]);
    // 页码标签随页面删除
    assert_eq!(doc.state().number_labels.len(), 2 + 3);
}

#[test]
fn test_merge_steps() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let dest = doc.state().steps[0].lookup();
    let source = doc.state().steps[1].lookup();

    assert_eq!(
        doc.merge_steps(MergeStepsOptions {
            source_step: source,
            dest_step: dest,
        }),
        Some(dest)
    );
    let state = doc.state();
    assert!(state.step(source.id).is_none());
    assert_eq!(state.step(dest.id).unwrap().parts, vec![0, 1]);
    let pli = state.pli(state.step(dest.id).unwrap().pli_id.unwrap()).unwrap();
    assert_eq!(pli.pli_items.len(), 2);
    assert_eq!(state.plis.len(), 2);
    assert!(state.page(1).unwrap().steps.is_empty());
}

#[test]
fn test_import_packs_steps() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    let pages = doc
        .import_model(&ImportOptions {
            steps_per_page: 2,
            ..ImportOptions::default()
        })
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(page_numbers(&doc), vec![1, 2]);
    let counts: Vec<_> = doc.state().pages.iter().map(|p| p.steps.len()).collect();
    assert_eq!(counts, vec![2, 1]);

    let page = &doc.state().pages[0];
    let a = doc.state().step(page.steps[0]).unwrap().bounds.unwrap();
    let b = doc.state().step(page.steps[1]).unwrap().bounds.unwrap();
    assert!(a.x < b.x);
    assert_eq!(a.y, b.y);
    assert_eq!(a.width, 450.0 - 40.0);
}

#[test]
fn test_title_page() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions {
        include_title_page: true,
        ..ImportOptions::default()
    })
    .unwrap();

    let state = doc.state();
    let title = state.title_page.as_ref().unwrap();
    let title_lookup = title.lookup();
    assert_eq!(state.page_list()[0].lookup(), title_lookup);
    assert_eq!(title.steps.len(), 1);
    let step = state.step(title.steps[0]).unwrap();
    assert_eq!(step.number, None);
    assert!(step.pli_id.is_none());

    let texts: Vec<_> = title
        .labels
        .iter()
        .map(|&id| state.label(id).unwrap().text.clone())
        .collect();
    assert_eq!(texts, vec!["Small House".to_string(), "3 parts, 3 pages".to_string()]);

    let csi = state.csi(step.csi_id.unwrap()).unwrap().bounds.unwrap();
    assert_eq!((csi.x, csi.y), (20.0, 20.0));
    assert_eq!(step.bounds.unwrap().width, 100.0 + 40.0);

    // 封面页只添加一次
    assert_eq!(doc.add_title_page().unwrap(), title_lookup);
    assert_eq!(doc.state().page_count(true), 4);
}

#[test]
fn test_callout_steps() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let step = doc.state().steps[0].lookup();

    let callout = doc.add_callout(step).unwrap();
    let first = doc
        .add_part_to_callout(AddPartToCalloutOptions {
            part_id: 0,
            step,
            callout,
        })
        .unwrap();
    let second = doc.add_step(AddStepOptions::new(callout)).unwrap();

    let state = doc.state();
    assert_eq!(state.step(first.id).unwrap().parts, vec![0]);
    assert_eq!(state.step(first.id).unwrap().number, Some(1));
    assert_eq!(state.step(second.id).unwrap().number, Some(2));
    assert!(state.step(second.id).unwrap().pli_id.is_none());
    assert_eq!(state.page_lookup_for_item(second), Some(state.pages[0].lookup()));

    // 插图框内的步骤只在插图框内导航
    assert_eq!(state.next_step(first, false).map(|s| s.id), Some(second.id));
    assert!(state.prev_step(first, false).is_none());

    assert!(doc.remove_part_from_callout(RemovePartFromCalloutOptions {
        part_id: 0,
        step: first,
    }));
    assert!(doc.state().step(first.id).unwrap().parts.is_empty());
}

#[test]
fn test_annotations() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let page = doc.state().pages[0].lookup();

    let options =
        AddAnnotationOptions::new(AnnotationType::Label, page, 50.0, 60.0).with_text("Hello");
    let label = doc.add_annotation(options).unwrap();
    assert_eq!(
        doc.state().annotation(label.id).unwrap().bounds,
        Some(Rect::new(50.0, 60.0, 50.0, 12.0))
    );

    doc.set_annotation(SetAnnotationOptions {
        annotation: label,
        text: Some("Hi".to_string()),
        do_layout: true,
    });
    assert_eq!(
        doc.state().annotation(label.id).unwrap().bounds,
        Some(Rect::new(50.0, 60.0, 20.0, 12.0))
    );

    // 类型不符的引用不会修改同ID的注释
    let wrong_type = doc.set_annotation(SetAnnotationOptions {
        annotation: Lookup::new(ItemType::Step, label.id),
        text: Some("Oops".to_string()),
        do_layout: false,
    });
    assert!(wrong_type.is_none());
    assert_eq!(
        doc.state().annotation(label.id).unwrap().text.as_deref(),
        Some("Hi")
    );

    let arrow = doc
        .add_annotation(AddAnnotationOptions::new(AnnotationType::Arrow, page, 10.0, 10.0))
        .unwrap();
    let points: Vec<_> = doc
        .state()
        .points
        .iter()
        .map(|p| (p.x, p.y))
        .collect();
    assert_eq!(points, vec![(10.0, 10.0), (110.0, 10.0)]);

    assert!(doc.delete_annotation(arrow));
    assert!(doc.state().points.is_empty());
    assert_eq!(doc.state().page(page.id).unwrap().annotations, vec![label.id]);
}

#[test]
fn test_displace_part() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let step = doc.state().steps[0].lookup();

    doc.displace_part(DisplacePartOptions::new(step, 1, Some(Direction::Up)));
    let displaced = &doc.state().step(step.id).unwrap().displaced_parts;
    assert_eq!(displaced.len(), 1);
    assert_eq!(displaced[0].part_distance, 60.0);

    doc.displace_part(DisplacePartOptions::new(step, 1, None));
    assert!(doc.state().step(step.id).unwrap().displaced_parts.is_empty());
}

#[test]
fn test_state_serde_roundtrip() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();

    let json = serde_json::to_string(doc.state()).unwrap();
    let restored: State = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.pages, doc.state().pages);
    assert_eq!(restored.steps.len(), doc.state().steps.len());
    for (a, b) in restored.pli_items.iter().zip(&doc.state().pli_items) {
        assert_eq!(a.lookup(), b.lookup());
        assert_eq!(a.parent, b.parent);
        assert_eq!(a.part_numbers, b.part_numbers);
    }
}

#[test]
fn test_add_step_and_callout_are_laid_out() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let page = doc.state().pages[1].lookup();

    let step = doc.add_step(AddStepOptions::new(page)).unwrap();
    let state = doc.state();
    assert!(state.step(step.id).unwrap().bounds.is_some());
    assert!(!state.page(page.id).unwrap().needs_layout);
    assert_eq!(state.page(page.id).unwrap().steps.len(), 2);

    let callout = doc.add_callout(step).unwrap();
    let callout_step = doc.add_step(AddStepOptions::new(callout)).unwrap();
    let state = doc.state();
    assert!(!state.page(page.id).unwrap().needs_layout);
    assert!(state.callout(callout.id).unwrap().bounds.is_some());
    assert!(state.step(callout_step.id).unwrap().bounds.is_some());
}

#[test]
fn test_callout_step_cannot_move_to_page() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let step = doc.state().steps[1].lookup();
    let callout = doc.add_callout(step).unwrap();
    let callout_step = doc.add_step(AddStepOptions::new(callout)).unwrap();
    let first = doc.state().pages[0].lookup();

    assert!(doc.move_step_to_previous_page(callout_step).is_none());
    assert!(doc.move_step_to_next_page(callout_step).is_none());
    assert!(doc
        .move_step_to_page(MoveStepOptions::new(callout_step, first))
        .is_none());

    let state = doc.state();
    assert_eq!(state.callout(callout.id).unwrap().steps, vec![callout_step.id]);
    assert_eq!(state.step(callout_step.id).unwrap().parent, Some(callout));
    assert_eq!(state.page(first.id).unwrap().steps.len(), 1);
}

#[test]
fn test_move_part_within_same_step() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let step = doc.state().steps[0].lookup();
    let before = doc.state().clone();

    let moved = doc.move_part_to_step(MovePartOptions {
        part_id: 1,
        src_step: step,
        dest_step: step,
    });
    assert_eq!(moved, Some(step));
    assert_eq!(doc.state(), &before);
    let pli = doc.state().step(step.id).unwrap().pli_id.unwrap();
    assert_eq!(doc.state().pli(pli).unwrap().pli_items.len(), 1);
}

#[test]
fn test_move_single_part_reparents_item() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let src = doc.state().steps[1].lookup();
    let dest = doc.state().steps[0].lookup();
    let src_pli = doc.state().step(src.id).unwrap().pli_id.unwrap();
    let dest_pli = doc.state().step(dest.id).unwrap().pli_id.unwrap();
    let plate_item = doc.state().pli(src_pli).unwrap().pli_items[0];
    let plate_qty = doc.state().pli_item(plate_item).unwrap().quantity_label;

    doc.move_part_to_step(MovePartOptions {
        part_id: 2,
        src_step: src,
        dest_step: dest,
    });

    // 目标中没有相同的项，整项连同数量标签挂到目标零件表
    let state = doc.state();
    assert!(state.pli(src_pli).unwrap().pli_items.is_empty());
    assert_eq!(state.pli(dest_pli).unwrap().pli_items.len(), 2);
    let item = state.pli_item(plate_item).unwrap();
    assert_eq!(item.parent, Some(Lookup::new(ItemType::Pli, dest_pli)));
    assert_eq!(item.part_numbers, vec![2]);
    assert_eq!(item.quantity_label, plate_qty);
    assert_eq!(state.pli_items.len(), 2);
    assert_eq!(state.pli_qtys.len(), 2);

    // 两个页面都已重新布局
    assert!(item.bounds.is_some());
    assert!(state.pli_qty(plate_qty.unwrap()).unwrap().bounds.is_some());
    assert!(state.pages.iter().all(|p| !p.needs_layout));
    assert_eq!(state.pli(src_pli).unwrap().bounds, Some(Rect::ZERO));
}

#[test]
fn test_move_split_part_lays_out_both_pages() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let src = doc.state().steps[0].lookup();
    let dest = doc.state().steps[1].lookup();

    doc.move_part_to_step(MovePartOptions {
        part_id: 1,
        src_step: src,
        dest_step: dest,
    });

    let state = doc.state();
    let dest_pli = state.pli(state.step(dest.id).unwrap().pli_id.unwrap()).unwrap();
    let split = state.pli_item(*dest_pli.pli_items.last().unwrap()).unwrap();
    assert_eq!(split.part_numbers, vec![1]);
    assert!(split.bounds.is_some());
    let qty = state.pli_qty(split.quantity_label.unwrap()).unwrap();
    assert!(qty.bounds.is_some());
    assert!(state.pages.iter().all(|p| !p.needs_layout));
}

#[test]
fn test_move_part_to_step_without_pli() {
    let mut doc = Document::new(two_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let src = doc.state().steps[1].lookup();
    let callout = doc.add_callout(src).unwrap();
    let callout_step = doc.add_step(AddStepOptions::new(callout)).unwrap();
    assert!(doc.state().step(callout_step.id).unwrap().pli_id.is_none());

    let moved = doc.move_part_to_step(MovePartOptions {
        part_id: 2,
        src_step: src,
        dest_step: callout_step,
    });
    assert_eq!(moved, Some(callout_step));

    // 来源零件表项数量归零后被删除
    let state = doc.state();
    assert!(state.step(src.id).unwrap().parts.is_empty());
    assert_eq!(state.step(callout_step.id).unwrap().parts, vec![2]);
    let src_pli = state.pli(state.step(src.id).unwrap().pli_id.unwrap()).unwrap();
    assert!(src_pli.pli_items.is_empty());
    assert_eq!(state.pli_items.len(), 1);
    assert_eq!(state.pli_qtys.len(), 1);
    assert!(state.pages.iter().all(|p| !p.needs_layout));
}

#[test]
fn test_step_renumbering_per_parent_type() {
    let mut doc = Document::new(three_step_model(), FixedSizes);
    doc.import_model(&ImportOptions::default()).unwrap();
    let target = doc.state().steps[0].lookup();
    let middle = doc.state().steps[1].lookup();
    let last_page = doc.state().pages[2].lookup();

    // 插图框步骤存放在两批页面步骤之间
    let callout = doc.add_callout(target).unwrap();
    let first = doc.add_step(AddStepOptions::new(callout)).unwrap();
    let second = doc.add_step(AddStepOptions::new(callout)).unwrap();
    let appended = doc.add_step(AddStepOptions::new(last_page)).unwrap();
    assert_eq!(doc.state().step(appended.id).unwrap().number, Some(appended.id));

    doc.merge_steps(MergeStepsOptions {
        source_step: middle,
        dest_step: target,
    });

    let state = doc.state();
    let page_step_numbers: Vec<_> = state
        .steps
        .iter()
        .filter(|s| s.parent.is_some_and(|p| p.item_type == ItemType::Page))
        .map(|s| s.number)
        .collect();
    assert_eq!(page_step_numbers, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(state.step(first.id).unwrap().number, Some(1));
    assert_eq!(state.step(second.id).unwrap().number, Some(2));
}
