//! Shared fixtures for integration tests
//!
//! Builds in-memory project and template databases with the same table
//! shapes the host tool writes, seeded with small but structurally real
//! source setups.

#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use vgen::TemplateStore;

pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database")
}

async fn exec(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}

const CONTROLS_TABLE: &str = r#"
    CREATE TABLE Controls (
        ControlId INTEGER PRIMARY KEY AUTOINCREMENT,
        Type INTEGER NOT NULL,
        PosX INTEGER NOT NULL DEFAULT 0,
        PosY INTEGER NOT NULL DEFAULT 0,
        Width INTEGER NOT NULL DEFAULT 0,
        Height INTEGER NOT NULL DEFAULT 0,
        ViewId INTEGER NOT NULL DEFAULT 0,
        DisplayName TEXT,
        JoinedId INTEGER NOT NULL DEFAULT 0,
        LimitMin REAL NOT NULL DEFAULT 0,
        LimitMax REAL NOT NULL DEFAULT 0,
        MainColor INTEGER NOT NULL DEFAULT 0,
        SubColor INTEGER NOT NULL DEFAULT 0,
        LabelColor INTEGER NOT NULL DEFAULT 0,
        LabelFont INTEGER NOT NULL DEFAULT 0,
        LabelAlignment INTEGER NOT NULL DEFAULT 0,
        LineThickness INTEGER NOT NULL DEFAULT 0,
        ThresholdValue REAL NOT NULL DEFAULT 0,
        Flags INTEGER NOT NULL DEFAULT 0,
        ActionType INTEGER NOT NULL DEFAULT 0,
        TargetType INTEGER NOT NULL DEFAULT 0,
        TargetId INTEGER NOT NULL DEFAULT 0,
        TargetChannel INTEGER NOT NULL DEFAULT -1,
        TargetProperty TEXT,
        TargetRecord INTEGER NOT NULL DEFAULT 0,
        ConfirmOnMsg TEXT,
        ConfirmOffMsg TEXT,
        PictureIdDay INTEGER NOT NULL DEFAULT 0,
        PictureIdNight INTEGER NOT NULL DEFAULT 0,
        Font TEXT NOT NULL DEFAULT '',
        Alignment INTEGER NOT NULL DEFAULT 0,
        Dimension TEXT
    )
"#;

/// Create an empty project with the host tool's baseline rows.
///
/// The baseline is the root group, the Master group, the unused-channels
/// bucket and one overlay view carrying a single control (the host tool
/// never leaves a set-up project without one).
pub async fn project_pool() -> SqlitePool {
    let pool = memory_pool().await;

    exec(
        &pool,
        r#"
        CREATE TABLE Groups (
            GroupId INTEGER PRIMARY KEY AUTOINCREMENT,
            Name TEXT NOT NULL,
            ParentId INTEGER NOT NULL,
            TargetId INTEGER NOT NULL DEFAULT 0,
            TargetChannel INTEGER NOT NULL DEFAULT -1,
            Type INTEGER NOT NULL DEFAULT 0,
            Flags INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .await;
    exec(
        &pool,
        r#"
        CREATE TABLE Views (
            ViewId INTEGER PRIMARY KEY AUTOINCREMENT,
            Type INTEGER NOT NULL,
            Name TEXT NOT NULL,
            Icon TEXT,
            Flags INTEGER,
            HomeViewIndex INTEGER,
            NaviBarIndex INTEGER,
            HRes INTEGER,
            VRes INTEGER,
            ZoomLevel INTEGER,
            ScalingFactor REAL,
            ScalingPosX REAL,
            ScalingPosY REAL,
            ReferenceVenueObjectId INTEGER
        )
        "#,
    )
    .await;
    exec(&pool, CONTROLS_TABLE).await;
    exec(
        &pool,
        r#"
        CREATE TABLE SourceGroups (
            SourceGroupId INTEGER PRIMARY KEY,
            Type INTEGER NOT NULL,
            Name TEXT NOT NULL,
            OrderIndex INTEGER NOT NULL DEFAULT 0,
            NextSourceGroupId INTEGER NOT NULL DEFAULT 0,
            ArrayProcessingEnable INTEGER NOT NULL DEFAULT 0,
            ArraySightId INTEGER
        )
        "#,
    )
    .await;
    exec(
        &pool,
        "CREATE TABLE SourceGroupsAdditionalData (SourceGroupId INTEGER, System TEXT)",
    )
    .await;
    exec(
        &pool,
        r#"
        CREATE TABLE SnapshotValues (
            SnapshotId INTEGER NOT NULL,
            TargetId INTEGER NOT NULL,
            TargetNode INTEGER NOT NULL,
            TargetProperty TEXT NOT NULL,
            Value INTEGER NOT NULL
        )
        "#,
    )
    .await;
    exec(
        &pool,
        "CREATE TABLE AmplifierChannels (DeviceId INTEGER, AmplifierChannel INTEGER, Name TEXT)",
    )
    .await;
    exec(
        &pool,
        "CREATE TABLE Cabinets (CabinetId INTEGER PRIMARY KEY, DeviceId INTEGER, AmplifierChannel INTEGER)",
    )
    .await;
    exec(
        &pool,
        "CREATE TABLE CabinetsAdditionalData (CabinetId INTEGER, Name TEXT, Linked INTEGER)",
    )
    .await;

    // Baseline rows from the host tool's initial setup.
    exec(
        &pool,
        "INSERT INTO Groups (GroupId, Name, ParentId, Flags) VALUES (1, 'Groups', 1, 1)",
    )
    .await;
    exec(&pool, "INSERT INTO Groups (Name, ParentId) VALUES ('Master', 1)").await;
    exec(
        &pool,
        "INSERT INTO Groups (Name, ParentId) VALUES ('Unused channels', 1)",
    )
    .await;
    exec(
        &pool,
        "INSERT INTO Views (Type, Name, HRes, VRes) VALUES (1000, 'Overview', 800, 600)",
    )
    .await;
    exec(
        &pool,
        "INSERT INTO Controls (Type, PosX, PosY, Width, Height, ViewId, DisplayName, JoinedId, Font)
         VALUES (12, 10, 10, 100, 40, 1, 'Overview', 1, 'Arial')",
    )
    .await;

    pool
}

async fn insert_group(
    pool: &SqlitePool,
    name: &str,
    parent_id: i64,
    target_id: i64,
    target_channel: i64,
    kind: i64,
) -> i64 {
    sqlx::query(
        "INSERT INTO Groups (Name, ParentId, TargetId, TargetChannel, Type, Flags)
         VALUES (?, ?, ?, ?, ?, 0)",
    )
    .bind(name)
    .bind(parent_id)
    .bind(target_id)
    .bind(target_channel)
    .bind(kind)
    .execute(pool)
    .await
    .unwrap();

    sqlx::query_scalar("SELECT max(GroupId) FROM Groups")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn group_id(pool: &SqlitePool, name: &str) -> Option<i64> {
    sqlx::query_scalar("SELECT GroupId FROM Groups WHERE Name = ? ORDER BY GroupId ASC")
        .bind(name)
        .fetch_optional(pool)
        .await
        .unwrap()
}

pub async fn master_group_id(pool: &SqlitePool) -> i64 {
    group_id(pool, "Master").await.unwrap()
}

async fn insert_device(
    pool: &SqlitePool,
    parent_id: i64,
    name: &str,
    device_id: i64,
    channel: i64,
    cabinet_id: i64,
) {
    insert_group(pool, name, parent_id, device_id, channel, 1).await;
    sqlx::query("INSERT INTO Cabinets (CabinetId, DeviceId, AmplifierChannel) VALUES (?, ?, ?)")
        .bind(cabinet_id)
        .bind(device_id)
        .bind(channel)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO CabinetsAdditionalData (CabinetId, Name, Linked) VALUES (?, ?, 0)")
        .bind(cabinet_id)
        .bind(format!("Cabinet {cabinet_id}"))
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO AmplifierChannels (DeviceId, AmplifierChannel, Name) VALUES (?, ?, ?)",
    )
    .bind(device_id)
    .bind(channel)
    .bind(name)
    .execute(pool)
    .await
    .unwrap();
    // Every patched channel shows up in the simulation snapshot, routed to
    // the first analog input.
    sqlx::query(
        "INSERT INTO SnapshotValues (SnapshotId, TargetId, TargetNode, TargetProperty, Value)
         VALUES (1, ?, ?, 'Config_InputEnable1', 1)",
    )
    .bind(device_id)
    .bind(channel)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_source(
    pool: &SqlitePool,
    source_group_id: i64,
    source_type: i64,
    name: &str,
    order_index: i64,
    ap_enable: i64,
    family: &str,
) -> i64 {
    sqlx::query(
        "INSERT INTO SourceGroups (SourceGroupId, Type, Name, OrderIndex, NextSourceGroupId, ArrayProcessingEnable, ArraySightId)
         VALUES (?, ?, ?, ?, 0, ?, 0)",
    )
    .bind(source_group_id)
    .bind(source_type)
    .bind(name)
    .bind(order_index)
    .bind(ap_enable)
    .execute(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO SourceGroupsAdditionalData (SourceGroupId, System) VALUES (?, ?)")
        .bind(source_group_id)
        .bind(family)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO Views (Type, Name, HRes, VRes) VALUES (1000, ?, 800, 600)")
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query_scalar("SELECT max(ViewId) FROM Views")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// A mono point source `Main` with two amplifier channels, mirrored under
/// the Master group the way the host tool sets point sources up.
pub async fn seed_point_source(pool: &SqlitePool) {
    let master = master_group_id(pool).await;
    insert_source(pool, 1, 2, "Main", 1, 0, "V8").await;

    let mirror = insert_group(pool, "Main", master, 0, -1, 0).await;
    insert_device(pool, mirror, "Main Amp 1", 101, 1, 1).await;
    insert_device(pool, mirror, "Main Amp 2", 101, 2, 2).await;
}

/// A stereo line array `PA` with TOPs L/R splits of two channels each.
pub async fn seed_stereo_array(pool: &SqlitePool) {
    insert_source(pool, 2, 1, "PA", 2, 0, "V8").await;

    // Array mirror groups live outside the Master tree.
    let mirror = insert_group(pool, "PA", 1, 0, -1, 0).await;
    let tops = insert_group(pool, "PA TOPs", mirror, 0, -1, 0).await;
    let tops_l = insert_group(pool, "PA TOPs L", tops, 0, -1, 0).await;
    let tops_r = insert_group(pool, "PA TOPs R", tops, 0, -1, 0).await;
    insert_device(pool, tops_l, "PA L 1", 201, 1, 11).await;
    insert_device(pool, tops_l, "PA L 2", 201, 2, 12).await;
    insert_device(pool, tops_r, "PA R 1", 202, 1, 13).await;
    insert_device(pool, tops_r, "PA R 2", 202, 2, 14).await;
}

/// A sub array `SUBarray` whose devices follow the `<name> L01-01` naming,
/// plus a crossover button on its view.
pub async fn seed_sub_array(pool: &SqlitePool) {
    let master = master_group_id(pool).await;
    let view_id = insert_source(pool, 3, 3, "SUBarray", 3, 0, "V8").await;

    let mirror = insert_group(pool, "SUBarray", master, 0, -1, 0).await;
    insert_device(pool, mirror, "Sub L01-01", 301, 1, 21).await;
    insert_device(pool, mirror, "Sub L02-01", 301, 2, 22).await;
    insert_device(pool, mirror, "Sub R01-01", 302, 1, 23).await;
    insert_device(pool, mirror, "Sub R02-01", 302, 2, 24).await;
    insert_device(pool, mirror, "Sub C01-01", 303, 1, 25).await;

    // Crossover control on the source's own view.
    sqlx::query(
        "INSERT INTO Controls (Type, PosX, PosY, Width, Height, ViewId, DisplayName, JoinedId, Font)
         VALUES (4, 10, 10, 40, 24, ?, '100Hz', 2, 'Arial')",
    )
    .bind(view_id)
    .execute(pool)
    .await
    .unwrap();
}

struct TemplateControl {
    control_type: i64,
    pos_x: i64,
    pos_y: i64,
    width: i64,
    height: i64,
    display_name: Option<&'static str>,
    target_type: i64,
    target_property: Option<&'static str>,
}

fn ctrl(control_type: i64, pos: (i64, i64), size: (i64, i64)) -> TemplateControl {
    TemplateControl {
        control_type,
        pos_x: pos.0,
        pos_y: pos.1,
        width: size.0,
        height: size.1,
        display_name: None,
        target_type: 0,
        target_property: None,
    }
}

fn named(mut c: TemplateControl, name: &'static str) -> TemplateControl {
    c.display_name = Some(name);
    c
}

fn with_property(mut c: TemplateControl, property: &'static str) -> TemplateControl {
    c.target_property = Some(property);
    c
}

fn view_button(mut c: TemplateControl) -> TemplateControl {
    c.target_type = 5;
    c
}

async fn insert_template(
    pool: &SqlitePool,
    name: &str,
    joined_id: i64,
    controls: Vec<TemplateControl>,
) {
    sqlx::query("INSERT INTO Sections (Name, ParentId, JoinedId, Description) VALUES (?, 1, ?, '')")
        .bind(name)
        .bind(joined_id)
        .execute(pool)
        .await
        .unwrap();

    for c in controls {
        sqlx::query(
            "INSERT INTO Controls (Type, PosX, PosY, Width, Height, ViewId, DisplayName, JoinedId,
                                   TargetType, TargetProperty, Font)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?, 'Arial')",
        )
        .bind(c.control_type)
        .bind(c.pos_x)
        .bind(c.pos_y)
        .bind(c.width)
        .bind(c.height)
        .bind(c.display_name)
        .bind(joined_id)
        .bind(c.target_type)
        .bind(c.target_property)
        .execute(pool)
        .await
        .unwrap();
    }
}

fn fader_block_controls(stereo: bool) -> Vec<TemplateControl> {
    let mut controls = vec![
        named(ctrl(12, (0, 0), (90, 220)), "Name"),
        ctrl(7, (10, 30), (20, 100)),
        with_property(named(ctrl(4, (40, 30), (40, 24)), "Mute"), "Config_Mute"),
        named(ctrl(4, (40, 60), (40, 24)), "View EQ"),
        with_property(named(ctrl(4, (40, 90), (40, 24)), "CUT"), "Config_Filter1"),
        with_property(ctrl(3, (40, 120), (40, 24)), "ChStatus_MsDelay"),
        with_property(ctrl(3, (40, 150), (40, 24)), "Config_Filter3"),
    ];
    if stereo {
        controls.insert(2, ctrl(7, (15, 30), (20, 100)));
        controls.insert(
            4,
            with_property(named(ctrl(4, (40, 45), (40, 24)), "Mute"), "Config_Mute"),
        );
    }
    controls
}

/// Build an in-memory template library covering every template the
/// generator stamps.
pub async fn template_store() -> TemplateStore {
    let pool = memory_pool().await;

    exec(
        &pool,
        "CREATE TABLE Sections (Id INTEGER PRIMARY KEY AUTOINCREMENT, Name TEXT NOT NULL,
                                ParentId INTEGER, JoinedId INTEGER NOT NULL, Description TEXT)",
    )
    .await;
    exec(&pool, CONTROLS_TABLE).await;

    let mut joined_id = 1;
    let mut next = || {
        let id = joined_id;
        joined_id += 1;
        id
    };

    insert_template(
        &pool,
        "Nav Button",
        next(),
        vec![view_button(named(ctrl(4, (0, 0), (80, 30)), "Nav"))],
    )
    .await;
    insert_template(
        &pool,
        "Meters Title",
        next(),
        vec![named(ctrl(12, (0, 0), (200, 50)), "Meters")],
    )
    .await;
    insert_template(
        &pool,
        "Meters Group",
        next(),
        vec![named(ctrl(12, (0, 0), (80, 24)), "Group")],
    )
    .await;
    insert_template(&pool, "Meter", next(), vec![ctrl(7, (0, 0), (60, 120))]).await;
    insert_template(
        &pool,
        "Master Title",
        next(),
        vec![named(ctrl(12, (0, 0), (200, 50)), "Master")],
    )
    .await;
    insert_template(
        &pool,
        "Master Main",
        next(),
        vec![
            named(ctrl(12, (0, 0), (100, 160)), "Main"),
            with_property(ctrl(3, (10, 40), (80, 24)), "Config_Gain"),
        ],
    )
    .await;
    insert_template(
        &pool,
        "Master ArraySight",
        next(),
        vec![named(ctrl(12, (0, 0), (100, 60)), "ArraySight")],
    )
    .await;
    insert_template(
        &pool,
        "THC",
        next(),
        vec![named(ctrl(4, (0, 0), (60, 40)), "THC")],
    )
    .await;

    for name in ["Group", "Group AP", "Group CPL2", "Group AP CPL2"] {
        insert_template(&pool, name, next(), fader_block_controls(false)).await;
    }
    for name in ["Group LR", "Group LR AP", "Group LR CPL2", "Group LR AP CPL2"] {
        insert_template(&pool, name, next(), fader_block_controls(true)).await;
    }

    // Not stamped by the pipeline; used to exercise the stamping rules
    // directly.
    insert_template(
        &pool,
        "Amp Status",
        next(),
        vec![with_property(ctrl(3, (0, 0), (80, 24)), "Settings_DeviceName")],
    )
    .await;
    insert_template(
        &pool,
        "Tab Switch",
        next(),
        vec![
            view_button(named(ctrl(4, (0, 0), (80, 30)), "Nav")),
            view_button(named(ctrl(4, (0, 40), (80, 30)), "Regular")),
        ],
    )
    .await;
    insert_template(
        &pool,
        "Blank Nav",
        next(),
        vec![
            named(ctrl(12, (0, 0), (80, 30)), ""),
            view_button(ctrl(4, (0, 40), (80, 30))),
        ],
    )
    .await;

    let store = TemplateStore::load(&pool).await.unwrap();
    pool.close().await;
    store
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}

pub async fn view_id(pool: &SqlitePool, name: &str) -> Option<i64> {
    sqlx::query_scalar("SELECT ViewId FROM Views WHERE Name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .unwrap()
}
