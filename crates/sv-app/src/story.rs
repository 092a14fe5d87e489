//! Narrative copy for the scrollable story page

pub const TITLE: &str = "One Step at a Time: Movement and Sleep in 22 Lives";

pub const INTRO: &str = "\
Twenty-two adults wore actigraphy devices around the clock while keeping a \
nightly sleep diary and providing morning hormone assays. What follows walks \
through how their daytime movement, body composition, and overnight \
physiology line up — and where they don't.";

pub const EFFICIENCY_HEADING: &str = "Not everyone sleeps the night they spend in bed";

pub const EFFICIENCY_BODY: &str = "\
Sleep efficiency is the share of time in bed actually spent asleep. Averaged \
over every recorded night, the spread across participants is wide: the best \
sleepers are asleep for well over nine of every ten minutes in bed, the worst \
closer to seven. Hover a bar for a participant's full sleep profile.";

pub const HORMONE_HEADING: &str = "The chemistry underneath";

pub const HORMONE_BODY: &str = "\
Morning melatonin and cortisol, normalized per assay and ordered by each \
participant's average sleep efficiency. Melatonin rises with efficiency while \
cortisol drifts the other way; the dashed lines are least-squares trends over \
the participants with complete assays.";

pub const HEATMAP_HEADING: &str = "A day in minutes";

pub const HEATMAP_BODY: &str = "\
Every minute of the day for one participant at a time. Color is the minute's \
mean heart-rate zone, opacity its step intensity. The overnight void, the \
commute spikes, and the evening wind-down read straight off the grid.";

pub const EXPLORER_HEADING: &str = "Explore the whole cohort yourself";

pub const EXPLORER_BODY: &str = "\
Each line below is one participant crossing every active axis at their value \
for that metric, colored by daily step tier. Toggle axes on and off, filter \
by sleep efficiency, drag along an axis to brush a range, and click a line to \
pin it. A short guided tour runs on first load.";

pub const CLOSING: &str = "\
No single metric separates the good sleepers from the poor ones — but the \
combinations are telling. The most active participants cluster toward high \
efficiency and low wake-after-sleep-onset, while high BMI with low activity \
rarely co-occurs with restful nights.";
