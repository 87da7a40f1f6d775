use placemark::config::Config;
use placemark::db::{Database, PlaceStore, StoredPlaces};
use placemark::map::{LocationError, MapViewAdapter, MemorySurface, Viewport};
use placemark::models::*;
use placemark::sync::{Submission, SyncController};
use speculate2::speculate;

const KEY: &str = "places";

type Controller = SyncController<StoredPlaces, MemorySurface>;

fn start(db: &Database) -> Controller {
    let map = MapViewAdapter::new(MemorySurface::new(), Config::default().map_settings());
    SyncController::start(StoredPlaces::new(db.clone(), KEY), map)
}

fn add(controller: &mut Controller, name: &str, lat: f64, lon: f64) -> Place {
    controller.on_map_click(lat, lon).expect("Click rejected");
    controller.set_name(name);
    controller.set_description(format!("{} description", name));
    match controller.submit() {
        Submission::Committed { place, .. } => place,
        Submission::Rejected(reason) => panic!("Submit rejected: {}", reason),
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let mut controller = start(&db);
    }

    describe "startup" {
        it "renders the seed places on a fresh store" {
            assert_eq!(controller.places().len(), 2);
            assert_eq!(controller.map().surface().markers().len(), 2);
            assert_eq!(controller.map().surface().container(), Some("map"));
            assert!(controller.draft().is_empty());
            assert!(!controller.can_submit());
        }

        it "shows the default viewport" {
            assert_eq!(
                controller.map().surface().viewport(),
                Some(Viewport { center: DEFAULT_CENTER, zoom: 12 })
            );
        }
    }

    describe "submit" {
        it "appends the clicked place, saves and re-renders" {
            controller.on_map_click(-23.50, -46.60).expect("Click rejected");
            assert!(controller.can_submit());
            controller.set_name("X");
            controller.set_description("Y");

            let Submission::Committed { place, publication } = controller.submit() else {
                panic!("Expected the place to be committed");
            };

            let expected = Place::new("X", "Y", Coordinate::new(-23.50, -46.60).unwrap()).unwrap();
            assert_eq!(place, expected);
            assert!(publication.persisted);
            assert!(publication.rendered);
            assert_eq!(controller.places().len(), 3);
            assert_eq!(controller.places()[2], expected);
            assert!(controller.draft().is_empty());

            let stored = StoredPlaces::new(db.clone(), KEY)
                .load()
                .expect("Load failed")
                .expect("Nothing stored");
            assert_eq!(stored.len(), 3);
            assert_eq!(stored[2], expected);
        }

        it "does nothing without a coordinate" {
            controller.set_name("X");
            controller.set_description("Y");

            assert_eq!(
                controller.submit(),
                Submission::Rejected(DraftError::MissingCoordinate)
            );
            assert_eq!(controller.places().len(), 2);
            assert!(db.get_blob(KEY).expect("Query failed").is_none());
            assert_eq!(controller.map().surface().added(), 2);
        }

        it "does nothing without a description" {
            controller.on_map_click(1.0, 1.0).expect("Click rejected");
            controller.set_name("X");

            assert_eq!(
                controller.submit(),
                Submission::Rejected(DraftError::MissingDescription)
            );
            assert_eq!(controller.draft().name(), "X");
            assert!(controller.draft().coordinate().is_some());
        }

        it "uses the last click before submission" {
            controller.on_map_click(1.0, 1.0).expect("Click rejected");
            controller.on_map_click(2.0, 2.0).expect("Click rejected");
            controller.set_name("X");
            controller.set_description("Y");

            let Submission::Committed { place, .. } = controller.submit() else {
                panic!("Expected the place to be committed");
            };
            assert_eq!(place.coordinate(), Coordinate::new(2.0, 2.0).unwrap());
        }

        it "requires a new click for the next place" {
            add(&mut controller, "First", 1.0, 1.0);
            controller.set_name("Second");
            controller.set_description("again");

            assert_eq!(
                controller.submit(),
                Submission::Rejected(DraftError::MissingCoordinate)
            );
        }
    }

    describe "reconcile" {
        it "keeps one marker per place across appends" {
            add(&mut controller, "A", 1.0, 1.0);
            add(&mut controller, "B", 2.0, 2.0);

            let surface = controller.map().surface();
            assert_eq!(controller.places().len(), 4);
            assert_eq!(surface.markers().len(), 4);
            // startup render plus one full rebuild per append
            assert_eq!(surface.added(), 2 + 3 + 4);
            assert_eq!(surface.removed(), 2 + 3);

            let titles: Vec<_> = surface.markers().iter().map(|m| m.popup.title.as_str()).collect();
            assert_eq!(titles, vec!["Bar do Zé", "Boteco da Esquina", "A", "B"]);
        }

        it "binds escaped popup markup to each marker" {
            controller.on_map_click(1.0, 1.0).expect("Click rejected");
            controller.set_name("Tom & Jerry");
            controller.set_description("<b>loud</b>");
            controller.submit();

            let markers = controller.map().surface().markers();
            assert_eq!(
                markers[0].html,
                "<b>Bar do Zé</b><br>Mesa oficial e cerveja gelada."
            );
            assert_eq!(
                markers[2].html,
                "<b>Tom &amp; Jerry</b><br>&lt;b&gt;loud&lt;/b&gt;"
            );
        }

        it "grows by exactly one per commit" {
            for i in 0..5 {
                add(&mut controller, &format!("P{}", i), i as f64, i as f64);
                assert_eq!(controller.places().len(), 2 + i + 1);
            }
        }
    }

    describe "restart" {
        it "hydrates from the saved list instead of the seed" {
            add(&mut controller, "Kept", 3.0, 4.0);
            drop(controller);

            let restarted = start(&db);
            assert_eq!(restarted.places().len(), 3);
            assert_eq!(restarted.places()[2].name(), "Kept");
            assert_eq!(restarted.map().surface().markers().len(), 3);
            assert!(restarted.draft().is_empty());
        }
    }

    describe "device position" {
        it "centers the map when it arrives first" {
            let at = Coordinate::new(-22.9, -43.2).unwrap();
            let view = controller.on_location(Ok(at));
            assert_eq!(view, Some(Viewport { center: at, zoom: 14 }));
        }

        it "falls back to the default view when unavailable" {
            let view = controller.on_location(Err(LocationError::Unsupported));
            assert_eq!(view, Some(Viewport { center: DEFAULT_CENTER, zoom: 12 }));
        }

        it "is ignored after the user clicked the map" {
            controller.on_map_click(1.0, 1.0).expect("Click rejected");
            let view = controller.on_location(Ok(Coordinate::new(-22.9, -43.2).unwrap()));
            assert_eq!(view, None);
            assert_eq!(
                controller.map().surface().viewport(),
                Some(Viewport { center: DEFAULT_CENTER, zoom: 12 })
            );
        }
    }
}
