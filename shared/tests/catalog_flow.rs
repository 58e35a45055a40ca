use crux_core::testing::AppTester;
use crux_http::http::StatusCode;
use crux_http::testing::ResponseBuilder;
use shared::app::{BrowseView, DetailView};
use shared::capabilities::{IndexPage, NamedResource, RecordPayload, StatPayload, TypeSlot};
use shared::filter::{SortDirection, SortKey};
use shared::pagination::{PageLabel, PageSummary};
use shared::{App, Effect, Event, Model, RecordId, Route, ScreenView};

fn payload(id: u32, name: &str, types: &[&str]) -> RecordPayload {
    RecordPayload {
        id,
        name: name.to_string(),
        types: types
            .iter()
            .zip(1u32..)
            .map(|(kind, slot)| TypeSlot {
                slot,
                kind: NamedResource::named(*kind),
            })
            .collect(),
        stats: vec![StatPayload {
            base_stat: 45,
            stat: NamedResource::named("hp"),
        }],
        height: 7,
        weight: 69,
        ..RecordPayload::default()
    }
}

fn numbered(count: u32) -> Vec<RecordPayload> {
    (1..=count)
        .map(|id| {
            let kind = if id % 3 == 0 { "fire" } else { "grass" };
            payload(id, &format!("mon{id:04}"), &[kind])
        })
        .collect()
}

fn starters() -> Vec<RecordPayload> {
    vec![
        payload(1, "bulbasaur", &["grass", "poison"]),
        payload(2, "ivysaur", &["grass", "poison"]),
        payload(3, "venusaur", &["grass", "poison"]),
        payload(4, "charmander", &["fire"]),
        payload(5, "charmeleon", &["fire"]),
        payload(6, "charizard", &["fire", "flying"]),
    ]
}

fn http_urls(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Http(request) => Some(request.operation.url.clone()),
            _ => None,
        })
        .collect()
}

/// A record response as the shell delivers it: raw JSON bytes.
fn raw(record: &RecordPayload) -> crux_http::Response<Vec<u8>> {
    ResponseBuilder::ok()
        .body(serde_json::to_vec(record).unwrap())
        .build()
}

fn index_of(records: &[RecordPayload]) -> IndexPage {
    IndexPage {
        results: records
            .iter()
            .map(|r| NamedResource::named(r.name.clone()))
            .collect(),
    }
}

/// Mounts `route` and answers the index and every record request.
fn load(app: &AppTester<App, Effect>, model: &mut Model, route: Route, records: &[RecordPayload]) {
    app.update(Event::Mount(route), model);
    let token = model.token;

    let update = app.update(
        Event::IndexFetched {
            token,
            result: Ok(ResponseBuilder::ok().body(index_of(records)).build()),
        },
        model,
    );
    assert_eq!(http_urls(&update.effects).len(), records.len());

    for (position, record) in (1u32..).zip(records) {
        app.update(
            Event::RecordFetched {
                token,
                position,
                result: Ok(raw(record)),
            },
            model,
        );
    }
}

fn browse(app: &AppTester<App, Effect>, model: &Model) -> BrowseView {
    match app.view(model).screen {
        ScreenView::Browse(view) => view,
        other => panic!("expected browse view, got {other:?}"),
    }
}

fn detail(app: &AppTester<App, Effect>, model: &Model) -> DetailView {
    match app.view(model).screen {
        ScreenView::Detail(view) => view,
        other => panic!("expected detail view, got {other:?}"),
    }
}

fn names(view: &BrowseView) -> Vec<String> {
    view.cards.iter().map(|c| c.name.clone()).collect()
}

fn answer_detail(app: &AppTester<App, Effect>, model: &mut Model, record: &RecordPayload) {
    let token = model.token;
    app.update(
        Event::DetailFetched {
            token,
            id: RecordId(record.id),
            result: Ok(raw(record)),
        },
        model,
    );
}

mod list_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_fan_out_after_the_index() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();

        app.update(Event::Mount(Route::List), &mut model);
        let update = app.update(
            Event::IndexFetched {
                token: model.token,
                result: Ok(ResponseBuilder::ok().body(index_of(&records)).build()),
            },
            &mut model,
        );

        assert_eq!(
            http_urls(&update.effects),
            (1..=6)
                .map(|id| format!("https://pokeapi.co/api/v2/pokemon/{id}"))
                .collect::<Vec<_>>()
        );
        assert!(matches!(app.view(&model).screen, ScreenView::Loading { .. }));
    }

    #[test]
    fn collection_appears_only_when_complete() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();

        app.update(Event::Mount(Route::List), &mut model);
        let token = model.token;
        app.update(
            Event::IndexFetched {
                token,
                result: Ok(ResponseBuilder::ok().body(index_of(&records)).build()),
            },
            &mut model,
        );

        let responses: Vec<(u32, &RecordPayload)> = (1u32..).zip(&records).collect();
        for (position, record) in responses.into_iter().skip(1).rev() {
            app.update(
                Event::RecordFetched {
                    token,
                    position,
                    result: Ok(raw(record)),
                },
                &mut model,
            );
            assert!(matches!(app.view(&model).screen, ScreenView::Loading { .. }));
        }

        app.update(
            Event::RecordFetched {
                token,
                position: 1,
                result: Ok(raw(&records[0])),
            },
            &mut model,
        );

        let view = browse(&app, &model);
        assert_eq!(view.cards.len(), 6);
        assert_eq!(view.cards[0].number, "#001");
        assert_eq!(view.cards[0].name, "Bulbasaur");
        assert_eq!(view.search.as_deref(), Some(""));
        assert!(view.categories.is_none());
        assert!(view.pagination.is_none());
    }

    #[test]
    fn pages_through_a_long_list() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::List, &numbered(151));

        let view = browse(&app, &model);
        assert_eq!(view.cards.len(), 70);
        assert_eq!(
            view.summary,
            PageSummary {
                first_index: 1,
                last_index: 70,
                total: 151
            }
        );
        let pagination = view.pagination.unwrap();
        assert_eq!(
            pagination.labels,
            vec![PageLabel::Page(1), PageLabel::Page(2), PageLabel::Page(3)]
        );
        assert!(!pagination.has_previous);

        app.update(Event::NextPage, &mut model);
        assert_eq!(browse(&app, &model).summary.first_index, 71);

        app.update(Event::PageSelected(3), &mut model);
        let view = browse(&app, &model);
        assert_eq!(view.cards.len(), 11);
        assert!(!view.pagination.unwrap().has_next);

        let update = app.update(Event::NextPage, &mut model);
        assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
        assert_eq!(browse(&app, &model).summary.first_index, 141);
    }

    #[test]
    fn search_resets_to_the_first_page() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::List, &numbered(151));

        app.update(Event::PageSelected(2), &mut model);
        app.update(Event::SearchChanged("MON01".into()), &mut model);

        let view = browse(&app, &model);
        assert_eq!(view.summary.total, 52);
        assert_eq!(view.summary.first_index, 1);
        assert_eq!(view.search.as_deref(), Some("MON01"));
    }

    #[test]
    fn sorts_by_name_and_by_id() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = vec![
            payload(1, "bulbasaur", &["grass"]),
            payload(2, "ivysaur", &["grass"]),
            payload(3, "charmander", &["fire"]),
        ];
        load(&app, &mut model, Route::List, &records);

        app.update(Event::SortKeyChanged(SortKey::Name), &mut model);
        assert_eq!(
            names(&browse(&app, &model)),
            vec!["Bulbasaur", "Charmander", "Ivysaur"]
        );

        app.update(Event::SortKeyChanged(SortKey::Id), &mut model);
        app.update(Event::SortDirectionChanged(SortDirection::Descending), &mut model);
        let ids: Vec<RecordId> = browse(&app, &model).cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![RecordId(3), RecordId(2), RecordId(1)]);
    }

    #[test]
    fn empty_search_result_reports_it() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::List, &starters());

        app.update(Event::SearchChanged("mewtwo".into()), &mut model);
        let view = browse(&app, &model);
        assert!(view.cards.is_empty());
        assert_eq!(
            view.empty_message.as_deref(),
            Some("No entries found with selected filters.")
        );
    }
}

mod gallery_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn category_choices_skip_excluded_kinds() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::Gallery, &starters());

        let kinds = IndexPage {
            results: ["fire", "grass", "unknown", "shadow"]
                .into_iter()
                .map(NamedResource::named)
                .collect(),
        };
        app.update(
            Event::CategoryKindsFetched {
                token: model.token,
                result: Ok(ResponseBuilder::ok().body(kinds).build()),
            },
            &mut model,
        );

        let chips = browse(&app, &model).categories.unwrap();
        let chip_names: Vec<&str> = chips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(chip_names, vec!["fire", "grass"]);
        assert!(chips.iter().all(|c| !c.active));
    }

    #[test]
    fn failed_category_request_falls_back_to_known_kinds() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::Gallery, &starters());

        let response = ResponseBuilder::with_status(StatusCode::InternalServerError)
            .body(IndexPage::default())
            .build();
        app.update(
            Event::CategoryKindsFetched {
                token: model.token,
                result: Ok(response),
            },
            &mut model,
        );

        let view = browse(&app, &model);
        assert_eq!(view.categories.unwrap().len(), 18);
        assert_eq!(view.cards.len(), 6);
    }

    #[test]
    fn categories_combine_with_or() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::Gallery, &starters());

        app.update(Event::CategoryToggled("flying".into()), &mut model);
        assert_eq!(names(&browse(&app, &model)), vec!["Charizard"]);

        app.update(Event::CategoryToggled("poison".into()), &mut model);
        assert_eq!(
            names(&browse(&app, &model)),
            vec!["Bulbasaur", "Ivysaur", "Venusaur", "Charizard"]
        );

        app.update(Event::CategoryToggled("flying".into()), &mut model);
        app.update(Event::CategoryToggled("poison".into()), &mut model);
        assert_eq!(browse(&app, &model).cards.len(), 6);
    }

    #[test]
    fn generation_and_category_combine_with_and() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::Gallery, &numbered(160));

        app.update(Event::GenerationSelected(Some("gen2".into())), &mut model);
        let view = browse(&app, &model);
        assert_eq!(view.summary.total, 9);
        let selected: Vec<String> = view
            .generations
            .unwrap()
            .into_iter()
            .filter(|g| g.selected)
            .filter_map(|g| g.key)
            .collect();
        assert_eq!(selected, vec!["gen2"]);

        app.update(Event::CategoryToggled("fire".into()), &mut model);
        let ids: Vec<RecordId> = browse(&app, &model).cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![RecordId(153), RecordId(156), RecordId(159)]);

        app.update(Event::GenerationSelected(None), &mut model);
        assert_eq!(browse(&app, &model).summary.total, 53);
    }

    #[test]
    fn unknown_generation_is_ignored() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        load(&app, &mut model, Route::Gallery, &starters());

        let update = app.update(Event::GenerationSelected(Some("gen42".into())), &mut model);
        assert!(update.effects.is_empty());
        assert_eq!(browse(&app, &model).cards.len(), 6);
    }
}

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_failed_record_fails_the_whole_collection() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = numbered(151);

        app.update(Event::Mount(Route::List), &mut model);
        let token = model.token;
        app.update(
            Event::IndexFetched {
                token,
                result: Ok(ResponseBuilder::ok().body(index_of(&records)).build()),
            },
            &mut model,
        );

        for (position, record) in (1u32..).zip(&records) {
            let result = if position == 77 {
                ResponseBuilder::with_status(StatusCode::InternalServerError)
                    .body(b"Internal Server Error".to_vec())
                    .build()
            } else {
                raw(record)
            };
            app.update(
                Event::RecordFetched {
                    token,
                    position,
                    result: Ok(result),
                },
                &mut model,
            );
        }

        match app.view(&model).screen {
            ScreenView::Failed {
                code, can_reload, ..
            } => {
                assert_eq!(code, "FETCH_FAILURE");
                assert!(can_reload);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn failed_index_fails_the_view_and_reload_starts_over() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();

        app.update(Event::Mount(Route::List), &mut model);
        let response = ResponseBuilder::with_status(StatusCode::ServiceUnavailable)
            .body(IndexPage::default())
            .build();
        app.update(
            Event::IndexFetched {
                token: model.token,
                result: Ok(response),
            },
            &mut model,
        );
        assert!(matches!(app.view(&model).screen, ScreenView::Failed { .. }));

        let update = app.update(Event::Reload, &mut model);
        assert_eq!(
            http_urls(&update.effects),
            vec!["https://pokeapi.co/api/v2/pokemon?limit=1025&offset=0"]
        );
        assert!(matches!(app.view(&model).screen, ScreenView::Loading { .. }));
    }

    fn assert_not_found(app: &AppTester<App, Effect>, model: &Model) {
        match app.view(model).screen {
            ScreenView::Failed {
                code, can_reload, ..
            } => {
                assert_eq!(code, "NOT_FOUND");
                assert!(!can_reload);
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn missing_detail_record_is_not_found() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();

        let update = app.update(Event::Mount(Route::Detail { id: RecordId(9999) }), &mut model);
        assert_eq!(
            http_urls(&update.effects),
            vec!["https://pokeapi.co/api/v2/pokemon/9999"]
        );

        let response = ResponseBuilder::with_status(StatusCode::NotFound)
            .body(b"Not Found".to_vec())
            .build();
        app.update(
            Event::DetailFetched {
                token: model.token,
                id: RecordId(9999),
                result: Ok(response),
            },
            &mut model,
        );

        assert_not_found(&app, &model);
    }

    #[test]
    fn not_found_reported_as_an_http_error_is_not_found() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        app.update(Event::Mount(Route::Detail { id: RecordId(9999) }), &mut model);

        let error = crux_http::Error::from(crux_http::http::Error::from_str(
            StatusCode::NotFound,
            "Not Found",
        ));
        app.update(
            Event::DetailFetched {
                token: model.token,
                id: RecordId(9999),
                result: Err(error),
            },
            &mut model,
        );

        assert_not_found(&app, &model);
    }

    #[test]
    fn responses_after_unmount_are_discarded() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();

        app.update(Event::Mount(Route::List), &mut model);
        let token = model.token;
        app.update(
            Event::IndexFetched {
                token,
                result: Ok(ResponseBuilder::ok().body(index_of(&records)).build()),
            },
            &mut model,
        );
        app.update(Event::Unmount, &mut model);

        for (position, record) in (1u32..).zip(&records) {
            let update = app.update(
                Event::RecordFetched {
                    token,
                    position,
                    result: Ok(raw(record)),
                },
                &mut model,
            );
            assert!(update.effects.is_empty());
        }
        assert_eq!(app.view(&model).screen, ScreenView::Idle);
    }
}

mod navigation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detail_walks_the_carried_view() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();
        load(&app, &mut model, Route::List, &records);

        let update = app.update(Event::RecordSelected { id: RecordId(3) }, &mut model);
        assert_eq!(
            http_urls(&update.effects),
            vec!["https://pokeapi.co/api/v2/pokemon/3"]
        );
        answer_detail(&app, &mut model, &records[2]);

        let view = detail(&app, &model);
        assert_eq!(view.record.name, "Venusaur");
        assert_eq!(view.record.length, "0.7 m");
        assert_eq!(view.record.mass, "6.9 kg");
        assert_eq!(view.record.metrics[0].label, "HP");
        assert!(view.has_previous);
        assert!(view.has_next);

        let update = app.update(Event::PreviousRecord, &mut model);
        assert_eq!(
            http_urls(&update.effects),
            vec!["https://pokeapi.co/api/v2/pokemon/2"]
        );
    }

    #[test]
    fn boundaries_disable_relative_navigation() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();
        load(&app, &mut model, Route::List, &records);

        app.update(Event::RecordSelected { id: RecordId(1) }, &mut model);
        answer_detail(&app, &mut model, &records[0]);
        let view = detail(&app, &model);
        assert!(!view.has_previous);
        assert!(view.has_next);

        let update = app.update(Event::PreviousRecord, &mut model);
        assert!(update.effects.is_empty());

        for record in &records[1..] {
            app.update(Event::NextRecord, &mut model);
            answer_detail(&app, &mut model, record);
        }
        let view = detail(&app, &model);
        assert_eq!(view.record.id, RecordId(6));
        assert!(view.has_previous);
        assert!(!view.has_next);
    }

    #[test]
    fn carried_view_is_the_filtered_one() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();
        load(&app, &mut model, Route::List, &records);

        app.update(Event::SearchChanged("char".into()), &mut model);
        app.update(Event::SortKeyChanged(SortKey::Name), &mut model);
        assert_eq!(
            names(&browse(&app, &model)),
            vec!["Charizard", "Charmander", "Charmeleon"]
        );

        app.update(Event::RecordSelected { id: RecordId(4) }, &mut model);
        answer_detail(&app, &mut model, &records[3]);
        let update = app.update(Event::NextRecord, &mut model);
        assert_eq!(
            http_urls(&update.effects),
            vec!["https://pokeapi.co/api/v2/pokemon/5"]
        );
        answer_detail(&app, &mut model, &records[4]);
        assert!(!detail(&app, &model).has_next);
    }

    #[test]
    fn direct_navigation_has_no_neighbours() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();

        app.update(Event::Mount(Route::Detail { id: RecordId(4) }), &mut model);
        answer_detail(&app, &mut model, &records[3]);

        let view = detail(&app, &model);
        assert!(!view.has_previous);
        assert!(!view.has_next);
        assert!(app.update(Event::NextRecord, &mut model).effects.is_empty());
    }

    #[test]
    fn stale_detail_response_is_ignored() {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        let records = starters();
        load(&app, &mut model, Route::List, &records);

        app.update(Event::RecordSelected { id: RecordId(2) }, &mut model);
        let first = model.token;
        app.update(Event::NextRecord, &mut model);

        app.update(
            Event::DetailFetched {
                token: first,
                id: RecordId(2),
                result: Ok(raw(&records[1])),
            },
            &mut model,
        );
        assert!(matches!(app.view(&model).screen, ScreenView::Loading { .. }));

        answer_detail(&app, &mut model, &records[2]);
        assert_eq!(detail(&app, &model).record.id, RecordId(3));
    }
}
