/// Range reports, heatmap cells, location roll-ups and the overlap policy.
mod helpers;

use helpers::*;
use kennelbook::domain::entities::{HeatmapBucket, UpdateKennelRequest};
use kennelbook::domain::errors::ErrorKind;

#[tokio::test]
async fn test_report_uses_peak_day_and_summarizes() {
    let engine = setup_memory_engine();
    let a = create_test_kennel(&engine, "A", 4).await;
    let b = create_test_kennel(&engine, "B", 2).await;
    for (i, (start, end)) in [("2024-01-01", "2024-01-05"), ("2024-01-03", "2024-01-04"), ("2024-01-04", "2024-01-09")]
        .iter()
        .enumerate()
    {
        let booking = create_test_booking(&engine, &format!("Pet {}", i)).await;
        engine
            .assign_kennel(&booking.id, &a.id, d(start), d(end))
            .await
            .unwrap();
    }

    let report = engine.occupancy(d("2024-01-01"), d("2024-01-07")).await.unwrap();
    assert_eq!(report.range_start, d("2024-01-01"));
    assert_eq!(report.range_end, d("2024-01-07"));

    let a_row = report.kennels.iter().find(|k| k.kennel_id == a.id).unwrap();
    assert_eq!(a_row.occupied, 3);
    assert_eq!(a_row.available, 1);
    assert_eq!(a_row.utilization_percent, 75);
    assert_eq!(a_row.bucket, HeatmapBucket::Medium);
    assert_eq!(a_row.active_segments.len(), 3);

    let b_row = report.kennels.iter().find(|k| k.kennel_id == b.id).unwrap();
    assert_eq!(b_row.occupied, 0);
    assert_eq!(b_row.bucket, HeatmapBucket::Empty);

    assert_eq!(report.summary.total_capacity, 6);
    assert_eq!(report.summary.total_occupied, 3);
    assert_eq!(report.summary.total_available, 3);
    assert_eq!(report.summary.overall_utilization_percent, 50);
}

#[tokio::test]
async fn test_daily_grid_has_one_cell_per_kennel_per_day() {
    let engine = setup_memory_engine();
    let a = create_test_kennel(&engine, "A", 1).await;
    create_test_kennel(&engine, "B", 1).await;
    let booking = create_test_booking(&engine, "Rex").await;
    engine
        .assign_kennel(&booking.id, &a.id, d("2024-01-02"), d("2024-01-03"))
        .await
        .unwrap();

    let cells = engine
        .occupancy
        .daily(d("2024-01-01"), d("2024-01-04"))
        .await
        .unwrap();
    assert_eq!(cells.len(), 8);

    let a_cells: Vec<_> = cells.iter().filter(|c| c.kennel_id == a.id).collect();
    let buckets: Vec<HeatmapBucket> = a_cells.iter().map(|c| c.bucket).collect();
    assert_eq!(
        buckets,
        vec![
            HeatmapBucket::Empty,
            HeatmapBucket::Full,
            HeatmapBucket::Full,
            HeatmapBucket::Empty
        ]
    );
}

#[tokio::test]
async fn test_queries_are_bounded() {
    let engine = setup_memory_engine();

    let err = engine
        .occupancy(d("2024-01-10"), d("2024-01-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let err = engine
        .occupancy(d("2024-01-01"), d("2025-01-02"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    // A full leap year is exactly the limit
    tokio_test::assert_ok!(engine.occupancy(d("2024-01-01"), d("2024-12-31")).await);
}

#[tokio::test]
async fn test_locations_group_by_building_and_floor() {
    let engine = setup_memory_engine();
    let north_1 = create_located_kennel(&engine, "N1", 2, "North", "Ground").await;
    let north_2 = create_located_kennel(&engine, "N2", 2, "North", "Ground").await;
    let south = create_located_kennel(&engine, "S1", 1, "South", "Upper").await;
    let general = create_test_kennel(&engine, "G1", 3).await;

    let booking = create_test_booking(&engine, "Rex").await;
    engine
        .assign_kennel(&booking.id, &north_1.id, d("2024-01-05"), d("2024-01-06"))
        .await
        .unwrap();
    let other = create_test_booking(&engine, "Bella").await;
    engine
        .assign_kennel(&other.id, &south.id, d("2024-01-05"), d("2024-01-05"))
        .await
        .unwrap();

    let groups = engine.occupancy.locations(d("2024-01-05")).await.unwrap();
    let labels: Vec<(&str, &str)> = groups
        .iter()
        .map(|g| (g.building.as_str(), g.floor.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![("General", "Main Floor"), ("North", "Ground"), ("South", "Upper")]
    );

    assert_eq!(groups[0].kennel_ids, vec![general.id.clone()]);
    assert_eq!(groups[0].occupied, 0);

    let mut north_ids = vec![north_1.id.clone(), north_2.id.clone()];
    north_ids.sort();
    assert_eq!(groups[1].kennel_ids, north_ids);
    assert_eq!(groups[1].capacity, 4);
    assert_eq!(groups[1].occupied, 1);
    assert_eq!(groups[1].available, 3);
    assert_eq!(groups[1].utilization_percent, 25);
    assert_eq!(groups[1].bucket, HeatmapBucket::Low);

    assert_eq!(groups[2].occupied, 1);
    assert_eq!(groups[2].bucket, HeatmapBucket::Full);
}

#[tokio::test]
async fn test_totals_for_very_large_kennels_do_not_overflow() {
    let engine = setup_memory_engine();
    let barn = create_test_kennel(&engine, "Barn", 3_000_000_000).await;
    create_test_kennel(&engine, "Field", 3_000_000_000).await;
    let booking = create_test_booking(&engine, "Rex").await;
    engine
        .assign_kennel(&booking.id, &barn.id, d("2024-01-05"), d("2024-01-05"))
        .await
        .unwrap();

    let report = engine.occupancy(d("2024-01-05"), d("2024-01-05")).await.unwrap();
    assert_eq!(report.summary.total_capacity, 6_000_000_000);
    assert_eq!(report.summary.total_occupied, 1);
    assert_eq!(report.summary.total_available, 5_999_999_999);
    assert_eq!(report.summary.overall_utilization_percent, 0);
    let barn_row = report.kennels.iter().find(|k| k.kennel_id == barn.id).unwrap();
    assert_eq!(barn_row.bucket, HeatmapBucket::Low);

    let groups = engine.occupancy.locations(d("2024-01-05")).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].capacity, 6_000_000_000);
    assert_eq!(groups[0].occupied, 1);
    assert_eq!(groups[0].bucket, HeatmapBucket::Low);
}

#[tokio::test]
async fn test_inclusive_policy_blocks_same_day_turnover() {
    let engine = setup_memory_engine();
    let kennel = create_test_kennel(&engine, "Single", 1).await;
    let leaving = create_test_booking(&engine, "Rex").await;
    let arriving = create_test_booking(&engine, "Bella").await;
    engine
        .assign_kennel(&leaving.id, &kennel.id, d("2024-01-01"), d("2024-01-03"))
        .await
        .unwrap();

    let err = engine
        .assign_kennel(&arriving.id, &kennel.id, d("2024-01-03"), d("2024-01-05"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceededError);
}

#[tokio::test]
async fn test_turnover_policy_frees_checkout_day() {
    let engine = setup_turnover_engine();
    let kennel = create_test_kennel(&engine, "Single", 1).await;
    let leaving = create_test_booking(&engine, "Rex").await;
    let arriving = create_test_booking(&engine, "Bella").await;
    engine
        .assign_kennel(&leaving.id, &kennel.id, d("2024-01-01"), d("2024-01-03"))
        .await
        .unwrap();
    engine
        .assign_kennel(&arriving.id, &kennel.id, d("2024-01-03"), d("2024-01-05"))
        .await
        .expect("checkout day should turn over");

    assert_eq!(occupied_on(&engine, &kennel.id, "2024-01-03").await, 1);
    assert_eq!(occupied_on(&engine, &kennel.id, "2024-01-05").await, 0);
}

#[tokio::test]
async fn test_capacity_cannot_drop_below_upcoming_peak() {
    let engine = setup_memory_engine();
    let kennel = create_test_kennel(&engine, "Run", 3).await;
    for name in ["Rex", "Bella"] {
        let booking = create_test_booking(&engine, name).await;
        engine
            .assign_kennel(&booking.id, &kennel.id, d("2024-01-10"), d("2024-01-12"))
            .await
            .unwrap();
    }

    let err = engine
        .catalog
        .update_kennel(
            &kennel.id,
            UpdateKennelRequest {
                capacity: Some(1),
                ..UpdateKennelRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceededError);

    let updated = engine
        .catalog
        .update_kennel(
            &kennel.id,
            UpdateKennelRequest {
                name: Some("Renamed".to_string()),
                capacity: Some(2),
                building: Some("East".to_string()),
                floor: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.capacity, 2);
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.building, "East");
    assert_eq!(updated.floor, "Main Floor");
}

#[tokio::test]
async fn test_kennel_validation() {
    use kennelbook::domain::entities::CreateKennelRequest;

    let engine = setup_memory_engine();
    let err = engine
        .catalog
        .create_kennel(CreateKennelRequest {
            name: "Zero".to_string(),
            capacity: 0,
            building: None,
            floor: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let err = engine
        .catalog
        .create_kennel(CreateKennelRequest {
            name: "   ".to_string(),
            capacity: 1,
            building: None,
            floor: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn test_maintenance_keeps_existing_occupants() {
    let engine = setup_memory_engine();
    let kennel = create_test_kennel(&engine, "Run", 2).await;
    let rex = create_test_booking(&engine, "Rex").await;
    engine
        .assign_kennel(&rex.id, &kennel.id, d("2024-01-10"), d("2024-01-12"))
        .await
        .unwrap();

    engine.set_kennel_active(&kennel.id, false).await.unwrap();
    assert_eq!(occupied_on(&engine, &kennel.id, "2024-01-11").await, 1);

    let bella = create_test_booking(&engine, "Bella").await;
    let err = engine
        .assign_kennel(&bella.id, &kennel.id, d("2024-01-10"), d("2024-01-12"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InactiveResourceError);
}
