#![allow(dead_code)]

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

/// (external id, surname, name, city, rating)
pub type Row<'a> = (i64, &'a str, &'a str, &'a str, f64);

const FIRST_ROW_HEADER: [&str; 9] = [
    "Место",
    "ID",
    "Фамилия",
    "Имя",
    "Отчество",
    "Дата рождения",
    "Город",
    "Очки",
    "Кол-во сыгранных турниров",
];

/// Header in row 1, separate name columns.
pub fn write_first_row_sheet(sheet: &mut Worksheet, rows: &[Row<'_>]) -> Result<(), XlsxError> {
    for (col, label) in FIRST_ROW_HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *label)?;
    }
    for (idx, (id, last, first, city, rating)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_number(row, 1, *id as f64)?;
        sheet.write_string(row, 2, *last)?;
        sheet.write_string(row, 3, *first)?;
        sheet.write_string(row, 5, "01.02.1990")?;
        sheet.write_string(row, 6, *city)?;
        sheet.write_number(row, 7, *rating)?;
        sheet.write_number(row, 8, 5.0)?;
    }
    Ok(())
}

/// Title block, header in row 10, combined ФИО column.
pub fn write_titled_combined_sheet(
    sheet: &mut Worksheet,
    rows: &[Row<'_>],
) -> Result<(), XlsxError> {
    sheet.write_string(0, 0, "Рейтинг-лист")?;
    for (col, label) in ["№", "ID", "ФИО", "Город", "Очки", "Кол-во турниров за 52 нед"]
        .iter()
        .enumerate()
    {
        sheet.write_string(9, col as u16, *label)?;
    }
    for (idx, (id, last, first, city, rating)) in rows.iter().enumerate() {
        let row = idx as u32 + 10;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_number(row, 1, *id as f64)?;
        sheet.write_string(row, 2, format!("{} {} Игоревич", last, first))?;
        sheet.write_string(row, 3, *city)?;
        sheet.write_number(row, 4, *rating)?;
        sheet.write_string(row, 5, "3")?;
    }
    Ok(())
}

/// Title block, header in row 11, split Ф/И/О columns.
pub fn write_titled_split_sheet(sheet: &mut Worksheet, rows: &[Row<'_>]) -> Result<(), XlsxError> {
    sheet.write_string(0, 0, "Рейтинг-лист")?;
    for (col, label) in ["№", "Код", "Ф", "И", "О", "Город", "Очки"].iter().enumerate() {
        sheet.write_string(10, col as u16, *label)?;
    }
    for (idx, (id, last, first, city, rating)) in rows.iter().enumerate() {
        let row = idx as u32 + 11;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_string(row, 1, id.to_string())?;
        sheet.write_string(row, 2, *last)?;
        sheet.write_string(row, 3, *first)?;
        sheet.write_string(row, 5, *city)?;
        sheet.write_number(row, 6, *rating)?;
    }
    // Footer without a rank is ignored.
    sheet.write_string(rows.len() as u32 + 12, 2, "Главный судья")?;
    Ok(())
}

/// January file: four of six categories, in three layouts, plus a
/// sheet that is not a category.
pub fn write_january_file(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("MD")?;
    write_first_row_sheet(
        sheet,
        &[
            (101, "Иванов", "Иван", "Москва", 1500.0),
            (102, "Петров", "Пётр", "Казань", 1500.0),
            (103, "Сидоров", "Семён", "Тверь", 1400.0),
        ],
    )?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Женщины, парный разряд")?;
    write_first_row_sheet(
        sheet,
        &[
            (201, "Смирнова", "Анна", "Москва", 1200.0),
            (202, "Кузнецова", "Ольга", "Пермь", 1100.0),
        ],
    )?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Юноши")?;
    write_titled_combined_sheet(sheet, &[(301, "Орлов", "Максим", "Сочи", 800.7)])?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("ЖМ")?;
    write_titled_split_sheet(
        sheet,
        &[
            (201, "Смирнова", "Анна", "Москва", 1300.0),
            (203, "Попова", "Мария", "Омск", 900.0),
        ],
    )?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Лист1")?;
    sheet.write_string(0, 0, "Пояснения к рейтингу")?;

    workbook.save(path)
}

/// February file: men's doubles only. 101 lost a city, 103 changed surname,
/// 104 is new.
pub fn write_february_file(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("MD")?;
    write_first_row_sheet(
        sheet,
        &[
            (103, "Сидоров-Белый", "Семён", "Тверь", 1600.0),
            (101, "Иванов", "Иван", "", 1450.0),
            (104, "Волков", "Олег", "Самара", 1450.0),
        ],
    )?;
    workbook.save(path)
}
