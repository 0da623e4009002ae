use boxwalk::{box_path, reachable_box_positions, reachable_positions};
use boxwalk::{Board, Levels, Metric, Move, MoveHistory};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Moves,
    Pushes,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Moves => Metric::Moves,
            MetricArg::Pushes => Metric::Pushes,
        }
    }
}

#[derive(Parser)]
#[command(name = "boxwalk")]
#[command(about = "A Sokoban board engine", long_about = None)]
struct Args {
    /// Path to the levels file (XSB format)
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number (1-indexed)
    #[arg(value_name = "LEVEL")]
    level: usize,

    /// Replay a LURD move string against the level
    #[arg(short, long, value_name = "LURD")]
    replay: Option<String>,

    /// Find an optimal push path for one box: source and target cells as x,y
    #[arg(short, long, num_args = 2, value_name = "X,Y")]
    box_path: Option<Vec<String>>,

    /// Optimization target for the box path search
    #[arg(short, long, value_enum, default_value = "moves")]
    metric: MetricArg,

    /// Print all cells the player can walk to
    #[arg(long)]
    reachable_player: bool,

    /// Print all cells the box at x,y can be pushed to
    #[arg(long, value_name = "X,Y")]
    reachable_box: Option<String>,
}

fn parse_cell(board: &Board, text: &str) -> Result<usize, String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("Expected x,y but got '{}'", text))?;
    let x: usize = x.trim().parse().map_err(|_| format!("Invalid x in '{}'", text))?;
    let y: usize = y.trim().parse().map_err(|_| format!("Invalid y in '{}'", text))?;
    if x >= board.width() || y >= board.height() {
        return Err(format!(
            "Cell {},{} lies outside the {}x{} board",
            x,
            y,
            board.width(),
            board.height()
        ));
    }
    Ok(board.index(x, y))
}

fn print_cells(board: &Board, cells: &[usize]) {
    let coords: Vec<String> = cells
        .iter()
        .map(|&pos| {
            let (x, y) = board.coords(pos);
            format!("{},{}", x, y)
        })
        .collect();
    println!("{}", coords.join(" "));
}

fn replay(board: &mut Board, lurd: &str) -> Result<(), String> {
    let mut history = MoveHistory::new();

    for (i, ch) in lurd.chars().enumerate() {
        let mv =
            Move::from_char(ch).ok_or_else(|| format!("Invalid move character '{}'", ch))?;
        let outcome = board.apply_move(mv.direction);
        println!("{} {}: {:?}", i + 1, ch, outcome);
        match outcome.to_move(mv.direction) {
            Some(applied) => history.add_move(applied),
            None => break,
        }
    }

    println!("{}", board);
    println!("lurd: {}", history.save_game_lurd());
    println!("solved: {}", board.is_solved());
    Ok(())
}

fn run(args: &Args) -> Result<(), String> {
    let levels = Levels::from_file(&args.levels_file).map_err(|e| e.to_string())?;

    if args.level == 0 || args.level > levels.len() {
        return Err(format!(
            "Level {} not found (file contains {} levels)",
            args.level,
            levels.len()
        ));
    }
    let mut board = levels.get(args.level - 1).unwrap().clone();

    if let Some(lurd) = &args.replay {
        return replay(&mut board, lurd);
    }

    if let Some(cells) = &args.box_path {
        let start = parse_cell(&board, &cells[0])?;
        let target = parse_cell(&board, &cells[1])?;
        match box_path(&mut board, start, target, args.metric.into()) {
            Some(path) => {
                print_cells(&board, &path.positions);
                println!("moves: {}  pushes: {}", path.moves, path.pushes);
            }
            None => println!("no path"),
        }
        return Ok(());
    }

    if args.reachable_player {
        let cells = reachable_positions(&board, board.player_position());
        print_cells(&board, &cells);
        return Ok(());
    }

    if let Some(cell) = &args.reachable_box {
        let pos = parse_cell(&board, cell)?;
        let cells = reachable_box_positions(&mut board, pos);
        print_cells(&board, &cells);
        return Ok(());
    }

    print!("{}", board);
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
