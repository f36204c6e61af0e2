use crate::domain::Prefecture;
use crate::scraper::{area_page_url, list_wards, CancelToken};
use crate::tests::utils::FakeFetcher;

const AREA_PAGE: &str = r#"
<html><body>
  <form id="js-areaSelectForm">
    <ul>
      <li>
        <input type="checkbox" value="">
        <label><span>さいたま市</span><span>(全域)</span></label>
      </li>
      <li>
        <input type="checkbox" name="sc" value="11101">
        <label><span>さいたま市西区</span><span>(1234)</span></label>
      </li>
      <li>
        <input type="checkbox" name="sc" value="11102">
        <label><span>さいたま市北区</span><span>(2345)</span></label>
      </li>
      <li>
        <label><span>見出し</span></label>
      </li>
      <li>
        <input type="checkbox" name="sc" value="11201">
        <label><span>川越市</span><span>(987)</span></label>
      </li>
    </ul>
  </form>
  <ul><li><input type="checkbox" value="99999"><label><span>外</span></label></li></ul>
</body></html>
"#;

#[test]
fn lists_coded_wards_in_page_order() {
    let saitama = Prefecture::from_code("11").unwrap();
    let url = area_page_url(&saitama).unwrap();
    assert_eq!(url.as_str(), "https://suumo.jp/chintai/saitama/city/");

    let fetcher = FakeFetcher::new().with_page(url.as_str(), AREA_PAGE.to_string());
    let wards = list_wards(&fetcher, &saitama, &CancelToken::new()).unwrap();

    let pairs: Vec<(&str, &str)> = wards
        .iter()
        .map(|w| (w.name.as_str(), w.code.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("さいたま市西区", "11101"),
            ("さいたま市北区", "11102"),
            ("川越市", "11201"),
        ]
    );
    assert!(wards.iter().all(|w| w.prefecture == saitama));
    assert_eq!(fetcher.requests().len(), 1);
}

#[test]
fn unknown_prefecture_code_is_an_error() {
    assert!(Prefecture::from_code("99").is_err());
    assert_eq!(Prefecture::from_code("13").unwrap().url_path, "tokyo");
}
